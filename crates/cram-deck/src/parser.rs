//! Line-oriented deck parser
//!
//! A deck is a flat text file of group headers and prompt lines:
//!
//! ```text
//! # comment
//! [Verbs | 120]
//! to run
//! to jump
//! [Nouns | 60]
//! the house
//! ```
//!
//! The parser makes one pass over the buffer, never backtracks and never
//! copies prompt text; groups and items are recorded as spans into the buffer,
//! which the resulting [`Session`] then owns.

use cram_config::DeckLimits;
use tracing::debug;

use crate::model::{Group, Item, Session, Span};
use crate::{DeckError, DeckResult, LineErrorKind};

/// Parse a deck held in memory
pub fn parse_session(buffer: Vec<u8>, limits: &DeckLimits) -> DeckResult<Session> {
    if buffer.len() > limits.max_file_bytes {
        return Err(DeckError::FileTooLarge {
            max: limits.max_file_bytes,
        });
    }

    let mut parser = Parser::new(limits);
    for line in lines(&buffer) {
        parser
            .handle_line(&buffer, &line)
            .map_err(|kind| DeckError::Line {
                line: line.number,
                kind,
            })?;
    }
    let (groups, items) = parser.finish()?;

    debug!(
        groups = groups.len(),
        items = items.len(),
        bytes = buffer.len(),
        "Deck parsed"
    );

    Ok(Session::new(buffer, groups, items))
}

/// One physical line: its 1-based number and its span in the buffer, EOL excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawLine {
    number: usize,
    span: Span,
}

/// Split on `\n`, dropping one `\r` before it. The text after the last `\n`
/// is always yielded, even when empty.
fn lines(buffer: &[u8]) -> impl Iterator<Item = RawLine> + '_ {
    let mut start = 0;
    buffer
        .split(|&b| b == b'\n')
        .enumerate()
        .map(move |(index, segment)| {
            let len = match segment.last() {
                Some(b'\r') => segment.len() - 1,
                _ => segment.len(),
            };
            let line = RawLine {
                number: index + 1,
                span: Span::new(start, len),
            };
            start += segment.len() + 1;
            line
        })
}

/// C `isspace` in the "C" locale, which also counts vertical tab
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Bounds of `bytes` with surrounding whitespace removed
fn trim_bounds(bytes: &[u8]) -> (usize, usize) {
    let start = bytes.iter().position(|&b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|&b| !is_space(b))
        .map_or(start, |i| i + 1);
    (start, end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineClass {
    Blank,
    Header,
    Item,
}

fn classify(text: &[u8]) -> LineClass {
    match text.iter().find(|&&b| !is_space(b)) {
        None | Some(b'#') => LineClass::Blank,
        Some(b'[') => LineClass::Header,
        Some(_) => LineClass::Item,
    }
}

/// A validated header, with the name span relative to the header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    name: Span,
    seconds: u32,
}

/// Parse `[ <name> | <seconds> ]`, splitting on the first interior `|`.
/// Leading blanks are skipped but the line itself must end with `]`.
fn parse_header(line: &[u8], max_seconds: u32) -> Result<Header, LineErrorKind> {
    let lo = line.iter().position(|&b| !is_space(b)).unwrap_or(line.len());
    let header = &line[lo..];

    let len = header.len();
    if len < 3 || header[0] != b'[' || header[len - 1] != b']' {
        return Err(LineErrorKind::MalformedHeader);
    }

    let interior = &header[1..len - 1];
    let pipe = interior
        .iter()
        .position(|&b| b == b'|')
        .ok_or(LineErrorKind::MalformedHeader)?;

    let name_part = &interior[..pipe];
    let (name_lo, name_hi) = trim_bounds(name_part);
    let name = &name_part[name_lo..name_hi];
    if name.is_empty() || name.contains(&b']') {
        return Err(LineErrorKind::MalformedHeader);
    }

    let seconds_part = &interior[pipe + 1..];
    let (sec_lo, sec_hi) = trim_bounds(seconds_part);
    if sec_lo >= sec_hi {
        return Err(LineErrorKind::MalformedHeader);
    }
    let seconds = parse_seconds(&seconds_part[sec_lo..sec_hi], max_seconds)
        .ok_or(LineErrorKind::InvalidSeconds)?;

    Ok(Header {
        // `[` sits at `lo`, the name part starts right after it
        name: Span::new(lo + 1 + name_lo, name.len()),
        seconds,
    })
}

/// Base-10 digits with at most one leading `+`, in `1..=max`
fn parse_seconds(text: &[u8], max: u32) -> Option<u32> {
    let digits = text.strip_prefix(b"+").unwrap_or(text);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value: u64 = std::str::from_utf8(digits).ok()?.parse().ok()?;
    if value == 0 || value > u64::from(max) {
        return None;
    }
    u32::try_from(value).ok()
}

struct Parser<'l> {
    limits: &'l DeckLimits,
    groups: Vec<Group>,
    items: Vec<Item>,
}

impl<'l> Parser<'l> {
    fn new(limits: &'l DeckLimits) -> Self {
        Self {
            limits,
            groups: Vec::new(),
            items: Vec::new(),
        }
    }

    fn handle_line(&mut self, buffer: &[u8], line: &RawLine) -> Result<(), LineErrorKind> {
        if line.span.len() > self.limits.max_line_len {
            return Err(LineErrorKind::LineTooLong);
        }
        let text = &buffer[line.span.range()];

        match classify(text) {
            LineClass::Blank => Ok(()),
            LineClass::Header => self.open_group(text, line.span.start()),
            LineClass::Item => self.push_item(line.span),
        }
    }

    fn open_group(&mut self, text: &[u8], offset: usize) -> Result<(), LineErrorKind> {
        // An empty group is only noticed once the next section begins
        if self.groups.last().is_some_and(|g| g.item_count == 0) {
            return Err(LineErrorKind::PreviousGroupEmpty);
        }

        let header = parse_header(text, self.limits.max_group_seconds)?;

        if self.groups.len() >= self.limits.max_groups {
            return Err(LineErrorKind::TooManyGroups);
        }

        self.groups.push(Group {
            name: Span::new(offset + header.name.start(), header.name.len()),
            seconds: header.seconds,
            item_start: self.items.len(),
            item_count: 0,
        });
        Ok(())
    }

    fn push_item(&mut self, span: Span) -> Result<(), LineErrorKind> {
        if self.groups.is_empty() {
            return Err(LineErrorKind::ItemBeforeHeader);
        }
        if self.items.len() >= self.limits.max_items_total {
            return Err(LineErrorKind::TooManyItems);
        }

        let max_per_group = self.limits.max_items_per_group;
        let group = self
            .groups
            .last_mut()
            .ok_or(LineErrorKind::ItemBeforeHeader)?;
        if group.item_count >= max_per_group {
            return Err(LineErrorKind::TooManyItemsInGroup);
        }

        group.item_count += 1;
        self.items.push(Item { text: span });
        Ok(())
    }

    fn finish(self) -> DeckResult<(Vec<Group>, Vec<Item>)> {
        match self.groups.last() {
            None => Err(DeckError::NoGroups),
            Some(last) if last.item_count == 0 => Err(DeckError::LastGroupEmpty),
            Some(_) => Ok((self.groups, self.items)),
        }
    }
}
