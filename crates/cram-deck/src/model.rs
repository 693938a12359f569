//! Deck model: groups and prompts as spans into one immutable buffer

use std::borrow::Cow;
use std::ops::Range;
use std::time::Duration;

/// A byte range into the session buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Resolve against the buffer this span was produced from
    pub fn resolve<'b>(&self, buffer: &'b [u8]) -> Option<&'b [u8]> {
        buffer.get(self.range())
    }
}

/// One prompt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub(crate) text: Span,
}

impl Item {
    pub fn text(&self) -> Span {
        self.text
    }
}

/// A named, timed run of prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub(crate) name: Span,
    pub(crate) seconds: u32,
    pub(crate) item_start: usize,
    pub(crate) item_count: usize,
}

impl Group {
    pub fn name(&self) -> Span {
        self.name
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Time budget before the group's switch becomes pending
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.seconds))
    }

    pub fn item_start(&self) -> usize {
        self.item_start
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Indices of this group's items in [`Session::items`]
    pub fn item_range(&self) -> Range<usize> {
        self.item_start..self.item_start + self.item_count
    }
}

/// A parsed deck: the raw file bytes plus the groups and items that point into them.
///
/// Only the parser constructs sessions, and nothing mutates one afterwards.
#[derive(Debug, Clone)]
pub struct Session {
    buffer: Vec<u8>,
    groups: Vec<Group>,
    items: Vec<Item>,
}

impl Session {
    pub(crate) fn new(buffer: Vec<u8>, groups: Vec<Group>, items: Vec<Item>) -> Self {
        Self {
            buffer,
            groups,
            items,
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn resolve(&self, span: Span) -> Option<&[u8]> {
        span.resolve(&self.buffer)
    }

    /// Raw name bytes of a group
    pub fn group_name(&self, index: usize) -> Option<&[u8]> {
        self.group(index).and_then(|g| self.resolve(g.name))
    }

    /// Group name for display; invalid UTF-8 is replaced
    pub fn group_label(&self, index: usize) -> Option<Cow<'_, str>> {
        self.group_name(index).map(String::from_utf8_lossy)
    }

    /// Exact text of a prompt, without its line ending
    pub fn item_text(&self, index: usize) -> Option<&[u8]> {
        self.item(index).and_then(|i| self.resolve(i.text))
    }

    /// Fingerprint of the input file, recorded in the event log
    pub fn digest(&self) -> blake3::Hash {
        blake3::hash(&self.buffer)
    }
}
