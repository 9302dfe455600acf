//! Property-based tests for the taint guard, escaping, labels, and lists.

use proptest::prelude::*;
use reportgen::{Block, Config, Markup, escape, format_inline, parse, slugify};

/// Text free of LaTeX control characters
fn plain_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,;:!?()/@=+-]{0,40}"
}

fn markup_strategy() -> impl Strategy<Value = Markup> {
    (any::<String>(), any::<bool>()).prop_map(|(text, safe)| {
        if safe {
            escape(&text)
        } else {
            Markup::raw(text)
        }
    })
}

/// Indentation depths for list lines; each line is at most one level deeper
/// than the previous one and the first is at the top level.
fn list_depths_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..4, 1..25).prop_map(|raw| {
        let mut depths = Vec::with_capacity(raw.len());
        let mut previous = 0;
        for (i, depth) in raw.into_iter().enumerate() {
            let depth = if i == 0 { 0 } else { depth.min(previous + 1) };
            depths.push(depth);
            previous = depth;
        }
        depths
    })
}

proptest! {
    #[test]
    fn concat_succeeds_only_for_safe_pairs(a in markup_strategy(), b in markup_strategy()) {
        let result = a.concat(&b);
        if a.is_safe() && b.is_safe() {
            let joined = result.unwrap();
            prop_assert!(joined.is_safe());
            prop_assert_eq!(joined.as_str(), format!("{}{}", a.as_str(), b.as_str()));
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn join_fails_on_any_unsafe_element(items in prop::collection::vec(markup_strategy(), 0..6)) {
        let result = Markup::literal(", ").join(&items);
        prop_assert_eq!(result.is_ok(), items.iter().all(Markup::is_safe));
    }

    #[test]
    fn replace_needs_safe_operands(a in markup_strategy(), b in markup_strategy()) {
        let result = a.replace("x", &b);
        prop_assert_eq!(result.is_ok(), a.is_safe() && b.is_safe());
        if let Ok(replaced) = result {
            prop_assert!(replaced.is_safe());
        }
    }

    #[test]
    fn escaping_plain_text_is_idempotent(text in plain_text_strategy()) {
        let once = escape(&text);
        prop_assert_eq!(once.as_str(), text.as_str());
        prop_assert_eq!(escape(once.as_str()), once);
    }

    #[test]
    fn escaped_text_has_no_bare_control_characters(text in any::<String>()) {
        let escaped = escape(&text).into_string();
        let mut prev = None;
        for ch in escaped.chars() {
            if matches!(ch, '#' | '$' | '%' | '&' | '_') {
                prop_assert_eq!(prev, Some('\\'));
            }
            prop_assert!(ch != '^' && ch != '~');
            prev = Some(ch);
        }
    }

    #[test]
    fn inline_formatting_always_yields_safe_markup(line in any::<String>()) {
        let line = line.replace(['\n', '\r'], " ");
        let formatted = format_inline(&line).unwrap();
        prop_assert!(formatted.is_safe());
    }

    #[test]
    fn slugs_are_normalised(title in any::<String>()) {
        let slug = slugify(&title);
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        prop_assert!(!slug.contains("--"));
        prop_assert_eq!(slugify(&title), slug);
    }

    #[test]
    fn nested_list_keeps_every_item(depths in list_depths_strategy()) {
        let mut input = String::from(
            "```title\ntitle = T\nauthor = A\ndate = D\nlogo = l.png\n```\n",
        );
        for (i, depth) in depths.iter().enumerate() {
            input.push_str(&"  ".repeat(*depth));
            input.push_str(&format!("* item {i}\n"));
        }

        let document = parse(input.as_bytes(), &Config::default()).unwrap();
        prop_assert_eq!(document.blocks.len(), 1);
        let Block::List(list) = &document.blocks[0] else {
            panic!("expected a list");
        };
        prop_assert_eq!(list.leaf_count(), depths.len());
        prop_assert_eq!(list.depth(), depths.iter().max().copied().unwrap_or(0) + 1);
    }
}
