/// Derive a cross-reference label from a heading title.
///
/// Lower-cases the title, turns spaces and periods into `-`, drops anything
/// that is not `[a-z0-9-]`, collapses runs of `-`, and trims `-` from both
/// ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.to_lowercase().chars() {
        let ch = match ch {
            ' ' | '.' => '-',
            c if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' => c,
            _ => continue,
        };
        if ch == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(ch);
    }
    slug.trim_matches('-').to_owned()
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(slugify("Cross-Site Scripting!!"), "cross-site-scripting");
    }

    #[test]
    fn separators_collapse_and_trim() {
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("v1.2 Release Notes."), "v1-2-release-notes");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn non_ascii_letters_are_removed() {
        assert_eq!(slugify("Résumé"), "rsum");
        assert_eq!(slugify("!!!"), "");
    }
}
