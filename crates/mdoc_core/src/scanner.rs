use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::Block;

static RE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}```[ \t]*([^\s`]*)[ \t]*$").unwrap());
// Four or more `#` never match and fall through to paragraph text.
static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,3})[ \t]+(.*)$").unwrap());
static RE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}> ?(.*)$").unwrap());
static RE_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*[-*+][ \t]+(.*)$").unwrap());
static RE_ORDERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(\d{1,9})\.[ \t]+(.*)$").unwrap());

/// Scan markdown text into a list of blocks.
///
/// Scanning never fails: anything that is not recognized as a heading, fence,
/// quote or list item becomes paragraph text.
pub fn scan(markdown: &str) -> Vec<Block> {
    let mut state = ScanState::default();

    for line in markdown.lines() {
        scan_line(line, &mut state);
    }

    state.finish()
}

/// A block still accepting lines
enum Open {
    Paragraph(String),
    Item {
        ordered: bool,
        index: Option<u32>,
        text: String,
    },
    Quote(Vec<String>),
    Fence {
        language: Option<String>,
        lines: Vec<String>,
    },
}

#[derive(Default)]
struct ScanState {
    blocks: Vec<Block>,
    open: Option<Open>,
    // A blank line was seen since the last emitted block
    pending_blank: bool,
}

impl ScanState {
    fn push(&mut self, block: Block) {
        if self.pending_blank && !self.blocks.is_empty() {
            self.blocks.push(Block::Blank);
        }
        self.pending_blank = false;
        self.blocks.push(block);
    }

    fn flush(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        let block = match open {
            Open::Paragraph(text) => Block::Paragraph { text },
            Open::Item {
                ordered,
                index,
                text,
            } => Block::ListItem {
                ordered,
                index,
                text,
            },
            Open::Quote(lines) => Block::Blockquote {
                text: lines.join("\n"),
            },
            Open::Fence { language, lines } => Block::CodeFence {
                language,
                text: lines.join("\n"),
            },
        };
        self.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        // An unterminated fence keeps everything captured so far
        self.flush();
        self.blocks
    }
}

fn scan_line(line: &str, state: &mut ScanState) {
    if let Some(Open::Fence { lines, .. }) = state.open.as_mut() {
        if RE_FENCE.is_match(line) {
            state.flush();
        } else {
            lines.push(line.to_string());
        }
        return;
    }

    if line.trim().is_empty() {
        state.flush();
        state.pending_blank = true;
        return;
    }

    if let Some(caps) = RE_FENCE.captures(line) {
        state.flush();
        let language = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);
        state.open = Some(Open::Fence {
            language,
            lines: Vec::new(),
        });
        return;
    }

    if let Some(caps) = RE_HEADING.captures(line) {
        state.flush();
        let level = caps[1].len() as u8;
        let text = caps[2].trim().to_string();
        state.push(Block::Heading { level, text });
        return;
    }

    if let Some(caps) = RE_QUOTE.captures(line) {
        let text = caps[1].trim_end().to_string();
        if let Some(Open::Quote(lines)) = state.open.as_mut() {
            lines.push(text);
        } else {
            state.flush();
            state.open = Some(Open::Quote(vec![text]));
        }
        return;
    }

    if let Some(caps) = RE_BULLET.captures(line) {
        state.flush();
        state.open = Some(Open::Item {
            ordered: false,
            index: None,
            text: caps[1].trim().to_string(),
        });
        return;
    }

    if let Some(caps) = RE_ORDERED.captures(line) {
        state.flush();
        state.open = Some(Open::Item {
            ordered: true,
            index: caps[1].parse().ok(),
            text: caps[2].trim().to_string(),
        });
        return;
    }

    // Plain text: lazy continuation of an open paragraph or list item
    let text = line.trim();
    match state.open.as_mut() {
        Some(Open::Paragraph(buf)) | Some(Open::Item { text: buf, .. }) => {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(text);
        }
        _ => {
            state.flush();
            state.open = Some(Open::Paragraph(text.to_string()));
        }
    }
}
