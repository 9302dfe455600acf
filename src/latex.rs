use std::io::Write;

use crate::block::{Block, Document, List, ListNode, Ordering, RecordKind};
use crate::config::Config;
use crate::error::ConvertError;
use crate::inline::render_spans;
use crate::markup::Markup;
use crate::template::{PlaceholderMap, resolve, resolve_optional, resolve_with};

const PREAMBLE: &str = r#"\documentclass[12pt]{report}
\usepackage[letterpaper,left=3 cm,top=2.5 cm,right=3 cm,bottom=2.5 cm,headheight=1.5 cm,headsep=1.5 cm,foot=1 cm,footskip=1.5 cm,includeheadfoot]{geometry}
\usepackage[english]{babel}
\usepackage{natbib}
\usepackage{url}
\usepackage[utf8x]{inputenc}
\usepackage{titletoc}
\usepackage{tocloft}
\usepackage{amsmath}
\usepackage{graphicx}
\usepackage{parskip}
\usepackage{fancyhdr}
\usepackage[hidelinks]{hyperref}
\usepackage[usenames,dvipsnames]{xcolor}
\usepackage{sectsty}
\usepackage{listings}
\usepackage{float}
\usepackage{realboxes}
\usepackage{longtable}%watermark%

\title{%title%}
\author{%author%}
\date{%date%}

\makeatletter
\let\thetitle\@title
\let\theauthor\@author
\let\thedate\@date
\makeatother

\pagestyle{fancy}
\fancyhf{}
\lhead{\includegraphics[height=1.5 cm]{%logo%}}
\rhead{\thetitle\text{ - }\theauthor}
\cfoot{\thepage}

\makeatletter
\renewcommand*\l@section{\@dottedtocline{1}{1.5em}{2.3em}}
\makeatother

\renewcommand{\thesection}{}
\renewcommand{\thesubsection}{}

\makeatletter
\def\@seccntformat#1{\csname #1ignore\expandafter\endcsname\csname the#1\endcsname\quad}
\let\sectionignore\@gobbletwo
\let\subsectionignore\@gobbletwo
\let\latex@numberline\numberline
\def\numberline#1{\if\relax#1\relax\else\latex@numberline{#1}\fi}
\makeatother

\setlength{\cftsubsecindent}{2cm}

\sectionfont{\color{Blue}}
\subsectionfont{\color{MidnightBlue}}

\addto\captionsenglish{\def\contentsname{\color{Blue} Contents}}

\definecolor{codegreen}{rgb}{0,0.6,0}
\definecolor{codegray}{rgb}{0.5,0.5,0.5}
\definecolor{codemauve}{rgb}{0.58,0,0.82}

\lstset{
  backgroundcolor=\color{white},
  basicstyle=\footnotesize,
  breaklines=true,
  captionpos=b,
  commentstyle=\color{codegreen},
  extendedchars=true,
  frame=single,
  keepspaces=true,
  keywordstyle=\color{blue},
  numbers=left,
  numbersep=5pt,
  numberstyle=\tiny\color{codegray},
  rulecolor=\color{black},
  showspaces=false,
  showstringspaces=false,
  showtabs=false,
  stringstyle=\color{codemauve},
  tabsize=2,
}

\begin{document}

\begin{titlepage}
  {
    \centering
    \vspace*{0.5 cm}
    \includegraphics[width=5.0 cm]{%logo%}\\[1.0 cm]
    { \huge \textbf{\thetitle} }%subtitle%\\[1.5 cm]
  }

  {
    \raggedleft%client%
    \textsc{\normalsize \thedate}\\[0.5 cm]
  }

  {
    \vfill
    \raggedright
    { \large \textbf{\theauthor} }%address%\\[2.0 cm]
  }%footer%
\end{titlepage}

\tableofcontents\thispagestyle{fancy}
\pagebreak
"#;

const WATERMARK: &str = r"
\usepackage{draftwatermark}

\SetWatermarkText{\textsc{%watermark%}}
\SetWatermarkScale{3.5}
\SetWatermarkLightness{0.95}";

const SUBTITLE: &str = r"\\[0.5 cm]
    { \Large \textbf{%subtitle%} }";

const CLIENT: &str = r"
    { \Large \textbf{%client%} }\\[0.5 cm]";

const ADDRESS: &str = r"\\[0.5 cm]
    \textsc{\normalsize %address1%\\%address2%}";

const FOOTER: &str = r"

  {
    \begin{center}
      \textbf{%footer%}
    \end{center}
  }";

/// Optional title-page pieces: slot name, template, and the declarations
/// that must all be present for the piece to appear.
const OPTIONAL_PARTS: &[(&str, &str, &[&str])] = &[
    ("watermark", WATERMARK, &["watermark"]),
    ("subtitle", SUBTITLE, &["subtitle"]),
    ("client", CLIENT, &["client"]),
    ("address", ADDRESS, &["address1", "address2"]),
    ("footer", FOOTER, &["footer"]),
];

const SECTION: &str = "\n\\section{%title%}\n\\label{%label%}\n";
const SUBSECTION: &str = "\n\\subsection{%title%}\n\\label{%label%}\n";
const SUBSUBSECTION: &str = "\n\\subsubsection{%title%}\n\\label{%label%}\n";

const PAGE_BREAK: &str = "\\pagebreak\n\n";

const VULNERABILITY: &str = r"\begin{longtable}{p{4 cm}p{9 cm}}
  \textbf{Rating:} &
  \textcolor{%color%}{\textbf{%rating%}} \\[0.5 cm]
  \textbf{Description:} &
  %description% \\[0.5 cm]
  \textbf{Impact:} &
  %impact% \\[0.5 cm]
  \textbf{Recommendation:} &
  %recommendation% \\[0.5 cm]
\end{longtable}
";

const FIGURE: &str = r"\begin{figure}[H]
  \centering
  \includegraphics[width=14.0 cm]{%graphic%}
  \caption{%caption%}
  \label{fig:%label%}
\end{figure}
";

const ITEMIZE: &str = "\\begin{itemize}\n";
const ITEMIZE_END: &str = "\\end{itemize}\n";
const ENUMERATE: &str = "\\begin{enumerate}\n";
const ENUMERATE_END: &str = "\\end{enumerate}\n";
const ITEM: &str = "\\item %item%\n";

const LISTING: &str = "\\begin{lstlisting}\n";
const LISTING_LANGUAGE: &str = "\\begin{lstlisting}[language=%language%]\n";
const LISTING_END: &str = "\\end{lstlisting}\n";

const PASSTHROUGH: &str = "% BEGIN INLINE BLOCK %\n";
const PASSTHROUGH_END: &str = "% END INLINE BLOCK %\n";

const POSTAMBLE: &str = "\n\n\\end{document}\n";

/// Resolve the title page and table of contents from the title declaration.
pub fn render_preamble(title: &PlaceholderMap) -> Result<Markup, ConvertError> {
    let mut slots = title.clone();
    for (slot, template, required) in OPTIONAL_PARTS {
        let part = resolve_optional(&Markup::literal(*template), required, title)?;
        for key in *required {
            slots.remove(key);
        }
        slots.set(*slot, part);
    }
    resolve_with(&Markup::literal(PREAMBLE), &slots, title)
}

pub fn render_postamble() -> Markup {
    Markup::literal(POSTAMBLE)
}

/// Resolve a block template whose values are body text. Unlike records,
/// body text never takes part in `[name]` resolution.
fn fill(template: &'static str, values: &PlaceholderMap) -> Result<Markup, ConvertError> {
    resolve_with(&Markup::literal(template), values, &PlaceholderMap::new())
}

fn render_list(list: &List) -> Result<Markup, ConvertError> {
    let (open, close) = match list.ordering {
        Ordering::Unordered => (ITEMIZE, ITEMIZE_END),
        Ordering::Ordered => (ENUMERATE, ENUMERATE_END),
    };

    let mut out = Markup::literal(open);
    for child in &list.children {
        let rendered = match child {
            ListNode::Leaf(spans) => {
                let item = PlaceholderMap::from_iter([("item", render_spans(spans)?)]);
                fill(ITEM, &item)?
            }
            ListNode::Container(nested) => render_list(nested)?,
        };
        out.push(&rendered)?;
    }
    out.push(&Markup::literal(close))?;
    Ok(out)
}

/// Verbatim lines, each followed by a newline.
fn verbatim_lines(lines: &[String]) -> Markup {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    Markup::trusted(text)
}

fn render_record(
    kind: RecordKind,
    fields: &PlaceholderMap,
    config: &Config,
) -> Result<Markup, ConvertError> {
    match kind {
        RecordKind::Vulnerability => {
            let mut values = fields.clone();
            let rating = fields.get("rating").map(Markup::as_str).unwrap_or_default();
            let color = config.ratings.color_for(rating).to_owned();
            values.set("color", Markup::raw(color));
            resolve(&Markup::literal(VULNERABILITY), &values)
        }
        RecordKind::Figure => resolve(&Markup::literal(FIGURE), fields),
    }
}

/// Render one body block.
pub fn render_block(block: &Block, config: &Config) -> Result<Markup, ConvertError> {
    match block {
        Block::Heading {
            level,
            title,
            label,
        } => {
            let template = match level {
                1 => SECTION,
                2 => SUBSECTION,
                _ => SUBSUBSECTION,
            };
            let values = PlaceholderMap::from_iter([
                ("title", render_spans(title)?),
                ("label", Markup::raw(label.as_str())),
            ]);
            fill(template, &values)
        }
        Block::List(list) => render_list(list),
        Block::CodeBlock { language, lines } => {
            let mut out = match language {
                Some(language) => {
                    let values =
                        PlaceholderMap::from_iter([("language", Markup::raw(language.as_str()))]);
                    fill(LISTING_LANGUAGE, &values)?
                }
                None => Markup::literal(LISTING),
            };
            out.push(&verbatim_lines(lines))?;
            out.push(&Markup::literal(LISTING_END))?;
            Ok(out)
        }
        Block::Passthrough { lines } => {
            let mut out = Markup::literal(PASSTHROUGH);
            out.push(&verbatim_lines(lines))?;
            out.push(&Markup::literal(PASSTHROUGH_END))?;
            Ok(out)
        }
        Block::Record { kind, fields } => render_record(*kind, fields, config),
        Block::Paragraph { content } => {
            let mut out = render_spans(content)?;
            out.push(&Markup::literal("\n"))?;
            Ok(out)
        }
        Block::BlankRun { count } => {
            if *count >= config.blocks.page_break_after {
                Ok(Markup::literal(PAGE_BREAK))
            } else {
                Ok(Markup::trusted("\n".repeat(*count)))
            }
        }
    }
}

/// Write a complete document: preamble, body blocks, and the closing marker.
pub fn write_document<W: Write + ?Sized>(
    document: &Document,
    config: &Config,
    out: &mut W,
) -> Result<(), ConvertError> {
    render_preamble(&document.title)?.write_to(out)?;
    for block in &document.blocks {
        render_block(block, config)?.write_to(out)?;
    }
    render_postamble().write_to(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::Span;

    fn text(s: &str) -> Vec<Span> {
        vec![Span::Text(s.into())]
    }

    fn render(block: &Block) -> String {
        render_block(block, &Config::default()).unwrap().into_string()
    }

    fn title(pairs: &[(&str, &'static str)]) -> PlaceholderMap {
        pairs
            .iter()
            .map(|(k, v)| (*k, Markup::literal(*v)))
            .collect()
    }

    #[test]
    fn heading_levels() {
        let heading = |level| Block::Heading {
            level,
            title: text("Intro"),
            label: "sec:intro".into(),
        };
        assert_eq!(render(&heading(1)), "\n\\section{Intro}\n\\label{sec:intro}\n");
        assert_eq!(
            render(&heading(2)),
            "\n\\subsection{Intro}\n\\label{sec:intro}\n"
        );
        assert_eq!(
            render(&heading(3)),
            "\n\\subsubsection{Intro}\n\\label{sec:intro}\n"
        );
    }

    #[test]
    fn bracketed_words_in_body_text_stay_literal() {
        let heading = Block::Heading {
            level: 1,
            title: text("Using [label] and [title]"),
            label: "sec:using-label-and-title".into(),
        };
        assert_eq!(
            render(&heading),
            "\n\\section{Using [label] and [title]}\n\\label{sec:using-label-and-title}\n"
        );

        let list = List {
            ordering: Ordering::Unordered,
            children: vec![ListNode::Leaf(text("see [item]"))],
        };
        assert_eq!(
            render(&Block::List(list)),
            "\\begin{itemize}\n\\item see [item]\n\\end{itemize}\n"
        );
    }

    #[test]
    fn nested_list() {
        let list = List {
            ordering: Ordering::Unordered,
            children: vec![
                ListNode::Leaf(text("a")),
                ListNode::Container(List {
                    ordering: Ordering::Ordered,
                    children: vec![ListNode::Leaf(text("b"))],
                }),
            ],
        };
        assert_eq!(
            render(&Block::List(list)),
            "\\begin{itemize}\n\\item a\n\\begin{enumerate}\n\\item b\n\\end{enumerate}\n\\end{itemize}\n"
        );
    }

    #[test]
    fn empty_list_keeps_wrapper() {
        assert_eq!(
            render(&Block::List(List::new(Ordering::Ordered))),
            "\\begin{enumerate}\n\\end{enumerate}\n"
        );
    }

    #[test]
    fn code_block_is_verbatim() {
        let block = Block::CodeBlock {
            language: Some("C++".into()),
            lines: vec!["int x = a & b; // 100%".into()],
        };
        assert_eq!(
            render(&block),
            "\\begin{lstlisting}[language=C++]\nint x = a & b; // 100%\n\\end{lstlisting}\n"
        );
        let plain = Block::CodeBlock {
            language: None,
            lines: vec![],
        };
        assert_eq!(render(&plain), "\\begin{lstlisting}\n\\end{lstlisting}\n");
    }

    #[test]
    fn passthrough_block() {
        let block = Block::Passthrough {
            lines: vec![r"\newpage".into()],
        };
        assert_eq!(
            render(&block),
            "% BEGIN INLINE BLOCK %\n\\newpage\n% END INLINE BLOCK %\n"
        );
    }

    #[test]
    fn blank_runs() {
        assert_eq!(render(&Block::BlankRun { count: 1 }), "\n");
        assert_eq!(render(&Block::BlankRun { count: 2 }), "\n\n");
        assert_eq!(render(&Block::BlankRun { count: 3 }), "\\pagebreak\n\n");
        assert_eq!(render(&Block::BlankRun { count: 7 }), "\\pagebreak\n\n");
    }

    #[test]
    fn vulnerability_color() {
        let fields = title(&[
            ("rating", "High"),
            ("description", "d"),
            ("impact", "i"),
            ("recommendation", "r"),
        ]);
        let out = render(&Block::Record {
            kind: RecordKind::Vulnerability,
            fields,
        });
        assert!(out.contains(r"\textcolor{Orange}{\textbf{High}}"));
        assert!(out.contains("  d \\\\[0.5 cm]"));
    }

    #[test]
    fn figure_record() {
        let fields = title(&[
            ("graphic", "net.png"),
            ("caption", "Network"),
            ("label", "net"),
        ]);
        let out = render(&Block::Record {
            kind: RecordKind::Figure,
            fields,
        });
        assert!(out.contains(r"\includegraphics[width=14.0 cm]{net.png}"));
        assert!(out.contains(r"\label{fig:net}"));
    }

    #[test]
    fn preamble_omits_missing_optional_parts() {
        let values = title(&[
            ("title", "Report"),
            ("author", "A"),
            ("date", "2024"),
            ("logo", "l.png"),
        ]);
        let out = render_preamble(&values).unwrap().into_string();
        assert!(out.contains(r"\title{Report}"));
        assert!(out.contains(r"\includegraphics[width=5.0 cm]{l.png}"));
        assert!(out.contains("\\usepackage{longtable}\n"));
        assert!(!out.contains("draftwatermark"));
        assert!(!out.contains("%subtitle%"));
        assert!(!out.contains("%footer%"));
    }

    #[test]
    fn preamble_includes_optional_parts() {
        let values = title(&[
            ("title", "Report"),
            ("author", "A"),
            ("date", "2024"),
            ("logo", "l.png"),
            ("subtitle", "Web"),
            ("client", "ACME"),
            ("address1", "1 Main St"),
            ("address2", "Springfield"),
            ("footer", "Prepared for [client]"),
            ("watermark", "Draft"),
        ]);
        let out = render_preamble(&values).unwrap().into_string();
        assert!(out.contains(r"\SetWatermarkText{\textsc{Draft}}"));
        assert!(out.contains(r"{ \Large \textbf{Web} }"));
        assert!(out.contains(r"{ \Large \textbf{ACME} }"));
        assert!(out.contains(r"\textsc{\normalsize 1 Main St\\Springfield}"));
        assert!(out.contains(r"\textbf{Prepared for ACME}"));
    }

    #[test]
    fn address_needs_both_lines() {
        let values = title(&[
            ("title", "Report"),
            ("author", "A"),
            ("date", "2024"),
            ("logo", "l.png"),
            ("address1", "1 Main St"),
        ]);
        let out = render_preamble(&values).unwrap().into_string();
        assert!(!out.contains("1 Main St"));
        assert!(!out.contains("%address%"));
    }
}
