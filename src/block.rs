use crate::inline::Span;
use crate::template::PlaceholderMap;

/// Whether a list is numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Ordered,
    Unordered,
}

/// One entry of a list: an item line or a nested list.
///
/// A nested list follows the item it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum ListNode {
    Leaf(Vec<Span>),
    Container(List),
}

/// A list (ordered or unordered) whose children share one indentation level
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordering: Ordering,
    pub children: Vec<ListNode>,
}

impl List {
    pub fn new(ordering: Ordering) -> Self {
        Self {
            ordering,
            children: Vec::new(),
        }
    }

    /// Number of item lines in this list and every nested list.
    pub fn leaf_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                ListNode::Leaf(_) => 1,
                ListNode::Container(list) => list.leaf_count(),
            })
            .sum()
    }

    /// Nesting depth; a list without nested lists has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .filter_map(|child| match child {
                ListNode::Container(list) => Some(list.depth()),
                ListNode::Leaf(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Kind of structured record fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Vulnerability,
    Figure,
}

impl RecordKind {
    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Vulnerability => "vulnerability",
            RecordKind::Figure => "figure",
        }
    }

    /// Fields every record of this kind must declare.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            RecordKind::Vulnerability => &["rating", "description", "impact", "recommendation"],
            RecordKind::Figure => &["graphic", "caption", "label"],
        }
    }
}

/// Block-level elements parsed from report markup
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        title: Vec<Span>,
        label: String,
    },
    List(List),
    CodeBlock {
        language: Option<String>,
        lines: Vec<String>,
    },
    /// Raw LaTeX copied to the output unchanged.
    Passthrough {
        lines: Vec<String>,
    },
    Record {
        kind: RecordKind,
        fields: PlaceholderMap,
    },
    Paragraph {
        content: Vec<Span>,
    },
    BlankRun {
        count: usize,
    },
}

/// A parsed report: the title declaration followed by the body blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: PlaceholderMap,
    pub blocks: Vec<Block>,
}
