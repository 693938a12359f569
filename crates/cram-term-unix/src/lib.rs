//! Unix terminal for cram
//!
//! Raw mode through termios on a duplicate of stdin, key waits through
//! `poll(2)`, drawing through ANSI escapes on stdout. The original terminal
//! settings are restored by [`Terminal::leave`] and again on drop.

use cram_term_api::{KeyWait, TermError, TermResult, Terminal};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::termios::{
    tcgetattr, tcsetattr, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg,
    SpecialCharacterIndices, Termios,
};
use std::fs::File;
use std::io::{self, IsTerminal, Read, Stdout, Write};
use std::os::fd::AsFd;
use std::time::Duration;
use tracing::{debug, warn};

const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";
const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";

/// Terminal on the process's stdin and stdout
pub struct UnixTerminal {
    input: File,
    output: Stdout,
    original: Option<Termios>,
}

impl UnixTerminal {
    /// Attach to stdin and stdout. Fails if stdin is not a terminal.
    pub fn new() -> TermResult<Self> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(TermError::NotATerminal);
        }

        let fd = stdin
            .as_fd()
            .try_clone_to_owned()
            .map_err(TermError::GetAttributes)?;

        Ok(Self {
            input: File::from(fd),
            output: io::stdout(),
            original: None,
        })
    }

    fn write_bytes(&mut self, parts: &[&[u8]]) -> TermResult<()> {
        let mut out = self.output.lock();
        for part in parts {
            out.write_all(part).map_err(TermError::Write)?;
        }
        out.flush().map_err(TermError::Write)
    }

    fn restore(&mut self) -> TermResult<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };
        tcsetattr(self.input.as_fd(), SetArg::TCSAFLUSH, &original)
            .map_err(|e| TermError::SetAttributes(e.into()))?;
        debug!("Terminal restored");
        Ok(())
    }
}

/// Non-canonical, non-echoing, no signal keys, no output processing, and reads
/// that return immediately.
fn make_raw(termios: &mut Termios) {
    termios.local_flags &=
        !(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG);
    termios.input_flags &= !(InputFlags::IXON
        | InputFlags::ICRNL
        | InputFlags::BRKINT
        | InputFlags::INPCK
        | InputFlags::ISTRIP);
    termios.output_flags &= !OutputFlags::OPOST;
    termios.control_flags |= ControlFlags::CS8;
    termios.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
    termios.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
}

/// Milliseconds for `poll`, rounded up so a short wait never busy-loops
fn poll_timeout(wait: KeyWait) -> PollTimeout {
    match wait {
        KeyWait::Indefinite => PollTimeout::NONE,
        KeyWait::Within(timeout) => {
            let millis = ceil_millis(timeout);
            PollTimeout::try_from(millis).unwrap_or(PollTimeout::MAX)
        }
    }
}

fn ceil_millis(timeout: Duration) -> i32 {
    let millis = timeout.as_nanos().div_ceil(1_000_000);
    i32::try_from(millis).unwrap_or(i32::MAX)
}

impl Terminal for UnixTerminal {
    fn enter(&mut self) -> TermResult<()> {
        if self.original.is_some() {
            return Ok(());
        }

        let original =
            tcgetattr(self.input.as_fd()).map_err(|e| TermError::GetAttributes(e.into()))?;
        let mut raw = original.clone();
        make_raw(&mut raw);
        tcsetattr(self.input.as_fd(), SetArg::TCSAFLUSH, &raw)
            .map_err(|e| TermError::SetAttributes(e.into()))?;
        self.original = Some(original);

        debug!("Terminal in raw mode");
        self.write_bytes(&[HIDE_CURSOR])
    }

    fn leave(&mut self) -> TermResult<()> {
        let drawn = self.write_bytes(&[SHOW_CURSOR, CLEAR_SCREEN]);
        self.restore()?;
        drawn
    }

    fn show_prompt(&mut self, text: &[u8]) -> TermResult<()> {
        self.write_bytes(&[CLEAR_SCREEN, text, b"\r\n"])
    }

    fn read_key(&mut self, wait: KeyWait) -> TermResult<Option<u8>> {
        let ready = {
            let mut fds = [PollFd::new(self.input.as_fd(), PollFlags::POLLIN)];
            match poll(&mut fds, poll_timeout(wait)) {
                Ok(0) => return Ok(None),
                Ok(_) => fds[0].revents().unwrap_or(PollFlags::empty()),
                Err(Errno::EINTR) => return Ok(None),
                Err(e) => return Err(TermError::Poll(e.into())),
            }
        };

        if ready.intersects(PollFlags::POLLERR | PollFlags::POLLNVAL) {
            return Err(TermError::Poll(io::Error::other(format!(
                "poll reported {:?}",
                ready
            ))));
        }
        if !ready.intersects(PollFlags::POLLIN | PollFlags::POLLHUP) {
            return Ok(None);
        }

        let mut byte = [0u8; 1];
        match self.input.read(&mut byte) {
            Ok(0) => Err(TermError::InputClosed),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(TermError::Read(e)),
        }
    }
}

impl Drop for UnixTerminal {
    fn drop(&mut self) {
        if self.original.is_some() {
            let _ = self.write_bytes(&[SHOW_CURSOR]);
            if let Err(e) = self.restore() {
                warn!(error = %e, "Failed to restore terminal on drop");
            }
        }
    }
}
