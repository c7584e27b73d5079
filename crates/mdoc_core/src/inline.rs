use crate::block::{RunStyle, StyledRun};

/// Split one block's text into styled runs.
///
/// Recognizes `` `code` ``, `**bold**` and `*italic*` left to right. Code spans
/// are never scanned for emphasis. Markers without a matching closer stay in
/// the text as literals.
pub fn format_inline(text: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    format_into(text, &mut runs);
    runs
}

/// Plain text of a run sequence with all style tags dropped.
pub fn plain_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// A `*` run and the pairs it opens or closes
#[derive(Debug, Default)]
struct Delimiter {
    can_open: bool,
    can_close: bool,
    /// Markers not consumed by any pair; painted as literal text
    remaining: usize,
    closes: Emphasis,
    opens: Emphasis,
}

#[derive(Debug, Default, Clone, Copy)]
struct Emphasis {
    bold: usize,
    italic: usize,
}

enum Token<'a> {
    Text(&'a str),
    Code(&'a str),
    Delimiter(usize),
}

fn format_into(text: &str, runs: &mut Vec<StyledRun>) {
    let (tokens, mut delimiters) = tokenize(text);
    pair_delimiters(&mut delimiters);

    let mut depth = Emphasis::default();
    let style = |depth: Emphasis, code: bool| RunStyle {
        bold: depth.bold > 0,
        italic: depth.italic > 0,
        code,
    };

    for token in tokens {
        match token {
            Token::Text(text) => push_run(runs, text, style(depth, false)),
            Token::Code(text) => push_run(runs, text, style(depth, true)),
            Token::Delimiter(idx) => {
                let delim = &delimiters[idx];
                depth.bold = depth.bold.saturating_sub(delim.closes.bold);
                depth.italic = depth.italic.saturating_sub(delim.closes.italic);
                push_run(runs, &"*".repeat(delim.remaining), style(depth, false));
                depth.bold += delim.opens.bold;
                depth.italic += delim.opens.italic;
            }
        }
    }
}

/// Split text into plain stretches, code spans and `*` runs in one pass.
fn tokenize(text: &str) -> (Vec<Token<'_>>, Vec<Delimiter>) {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut delimiters = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'`' => match find_byte(bytes, i + 1, b'`') {
                Some(end) if end > i + 1 => {
                    push_text(&mut tokens, &text[plain_start..i]);
                    tokens.push(Token::Code(&text[i + 1..end]));
                    i = end + 1;
                    plain_start = i;
                }
                _ => i += 1,
            },
            b'*' => {
                push_text(&mut tokens, &text[plain_start..i]);
                let mut run_end = i;
                while run_end < bytes.len() && bytes[run_end] == b'*' {
                    run_end += 1;
                }
                let len = run_end - i;
                delimiters.push(Delimiter {
                    can_open: bytes.get(run_end).is_some_and(|b| !b.is_ascii_whitespace()),
                    can_close: i > 0 && !bytes[i - 1].is_ascii_whitespace(),
                    remaining: len,
                    ..Delimiter::default()
                });
                tokens.push(Token::Delimiter(delimiters.len() - 1));
                i = run_end;
                plain_start = i;
            }
            _ => i += 1,
        }
    }

    push_text(&mut tokens, &text[plain_start..]);
    (tokens, delimiters)
}

fn push_text<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
}

/// Match closers against the nearest open run, left to right.
///
/// Two markers pair as bold when both runs still hold two, otherwise one pairs
/// as italic. Pairs always nest, and each run is visited a bounded number of
/// times per consumed marker, so the whole pass is linear in the text.
fn pair_delimiters(delimiters: &mut [Delimiter]) {
    let mut openers: Vec<usize> = Vec::new();

    for idx in 0..delimiters.len() {
        if delimiters[idx].can_close {
            while delimiters[idx].remaining > 0 {
                let Some(&open) = openers.last() else {
                    break;
                };
                let width = if delimiters[open].remaining >= 2 && delimiters[idx].remaining >= 2 {
                    2
                } else {
                    1
                };
                delimiters[open].remaining -= width;
                delimiters[idx].remaining -= width;
                if width == 2 {
                    delimiters[open].opens.bold += 1;
                    delimiters[idx].closes.bold += 1;
                } else {
                    delimiters[open].opens.italic += 1;
                    delimiters[idx].closes.italic += 1;
                }
                if delimiters[open].remaining == 0 {
                    openers.pop();
                }
            }
        }

        let delim = &delimiters[idx];
        if delim.can_open && delim.remaining > 0 {
            openers.push(idx);
        }
    }
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|pos| from + pos)
}

fn push_run(runs: &mut Vec<StyledRun>, text: &str, style: RunStyle) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => runs.push(StyledRun::new(text, style)),
    }
}
