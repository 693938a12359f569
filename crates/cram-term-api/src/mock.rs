//! Scripted terminal for testing

use cram_util::ManualClock;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crate::{KeyWait, TermError, TermResult, Terminal};

/// One scripted answer to [`Terminal::read_key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockInput {
    /// A key is already waiting
    Key(u8),
    /// The key arrives after some time has passed
    KeyAfter(Duration, u8),
    /// Nothing arrives: a bounded wait runs to its full timeout
    Timeout,
    /// The wait returns early with no key and no time passing
    Interrupted,
}

/// Terminal that replays a script of inputs and records what was drawn.
///
/// Time only moves through the shared [`ManualClock`]: a `Timeout` advances it
/// by the requested wait, `KeyAfter` by its delay. Once the script runs out
/// every read fails with [`TermError::InputClosed`].
#[derive(Debug)]
pub struct MockTerminal {
    script: VecDeque<MockInput>,
    clock: ManualClock,
    screens: Vec<Vec<u8>>,
    waits: Vec<KeyWait>,
    enter_count: usize,
    leave_count: usize,
    raw: bool,

    /// Make `show_prompt` fail
    pub fail_show: bool,

    /// Make `leave` fail
    pub fail_leave: bool,
}

impl MockTerminal {
    pub fn new(script: impl IntoIterator<Item = MockInput>, clock: ManualClock) -> Self {
        Self {
            script: script.into_iter().collect(),
            clock,
            screens: Vec::new(),
            waits: Vec::new(),
            enter_count: 0,
            leave_count: 0,
            raw: false,
            fail_show: false,
            fail_leave: false,
        }
    }

    /// Convenience for a script of immediate keys
    pub fn with_keys(keys: &[u8], clock: ManualClock) -> Self {
        Self::new(keys.iter().copied().map(MockInput::Key), clock)
    }

    /// Every prompt drawn, in order
    pub fn screens(&self) -> &[Vec<u8>] {
        &self.screens
    }

    /// Prompt currently on screen
    pub fn current_screen(&self) -> Option<&[u8]> {
        self.screens.last().map(Vec::as_slice)
    }

    /// Every wait requested, in order
    pub fn waits(&self) -> &[KeyWait] {
        &self.waits
    }

    pub fn enter_count(&self) -> usize {
        self.enter_count
    }

    pub fn leave_count(&self) -> usize {
        self.leave_count
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Inputs not consumed yet
    pub fn remaining_inputs(&self) -> usize {
        self.script.len()
    }
}

impl Terminal for MockTerminal {
    fn enter(&mut self) -> TermResult<()> {
        self.enter_count += 1;
        self.raw = true;
        Ok(())
    }

    fn leave(&mut self) -> TermResult<()> {
        self.leave_count += 1;
        self.raw = false;
        if self.fail_leave {
            return Err(TermError::SetAttributes(io::Error::other("mock leave failure")));
        }
        Ok(())
    }

    fn show_prompt(&mut self, text: &[u8]) -> TermResult<()> {
        if self.fail_show {
            return Err(TermError::Write(io::Error::other("mock write failure")));
        }
        self.screens.push(text.to_vec());
        Ok(())
    }

    fn read_key(&mut self, wait: KeyWait) -> TermResult<Option<u8>> {
        self.waits.push(wait);

        match self.script.pop_front().ok_or(TermError::InputClosed)? {
            MockInput::Key(key) => Ok(Some(key)),
            MockInput::KeyAfter(delay, key) => {
                self.clock.advance(delay);
                Ok(Some(key))
            }
            MockInput::Timeout => {
                if let KeyWait::Within(timeout) = wait {
                    self.clock.advance(timeout);
                }
                Ok(None)
            }
            MockInput::Interrupted => Ok(None),
        }
    }
}
