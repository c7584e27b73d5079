/// Inline style tags carried by a run of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl RunStyle {
    pub const PLAIN: RunStyle = RunStyle {
        bold: false,
        italic: false,
        code: false,
    };
    pub const BOLD: RunStyle = RunStyle {
        bold: true,
        ..RunStyle::PLAIN
    };
    pub const ITALIC: RunStyle = RunStyle {
        italic: true,
        ..RunStyle::PLAIN
    };
    pub const CODE: RunStyle = RunStyle {
        code: true,
        ..RunStyle::PLAIN
    };

    pub fn is_plain(&self) -> bool {
        *self == RunStyle::PLAIN
    }

    /// Union of both tag sets.
    pub fn with(self, other: RunStyle) -> RunStyle {
        RunStyle {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            code: self.code || other.code,
        }
    }
}

/// A contiguous span of block text with its style tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunStyle::PLAIN)
    }
}

/// Block-level elements scanned from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    CodeFence {
        language: Option<String>,
        text: String,
    },
    ListItem {
        ordered: bool,
        /// Literal index as written in the source, ordered items only
        index: Option<u32>,
        text: String,
    },
    Blockquote {
        text: String,
    },
    /// One or more blank source lines between two blocks
    Blank,
}

impl Block {
    pub fn is_ordered_item(&self) -> bool {
        matches!(self, Block::ListItem { ordered: true, .. })
    }
}

/// Number each ordered list item.
///
/// Returns one entry per block: `Some(n)` for ordered items, `None` otherwise.
/// A maximal contiguous run of ordered items starts at its first item's literal
/// index and counts up by one; any other block ends the run.
pub fn ordinals(blocks: &[Block]) -> Vec<Option<u32>> {
    let mut out = Vec::with_capacity(blocks.len());
    let mut next: Option<u32> = None;

    for block in blocks {
        match block {
            Block::ListItem {
                ordered: true,
                index,
                ..
            } => {
                let n = next.unwrap_or(index.unwrap_or(1));
                out.push(Some(n));
                next = Some(n.saturating_add(1));
            }
            _ => {
                out.push(None);
                next = None;
            }
        }
    }

    out
}
