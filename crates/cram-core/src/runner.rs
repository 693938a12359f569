//! Session runner: plays the scheduler against a terminal, an event log and a clock

use cram_config::RunLimits;
use cram_deck::Session;
use cram_log::{EventLog, LogEvent};
use cram_term_api::Terminal;
use cram_util::{Clock, MonotonicInstant};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::{CoreEvent, KeyOutcome, Rng, RunError, RunResult, Scheduler};

/// What a finished run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub prompts_shown: usize,
    pub group_switches: usize,
    pub keys: usize,
    pub elapsed: Duration,
}

/// Drives one session from the first prompt until the operator quits
pub struct Runner<'a> {
    session: &'a Session,
    rng: Rng,
    terminal: &'a mut dyn Terminal,
    log: &'a mut dyn EventLog,
    clock: &'a dyn Clock,
    limits: RunLimits,
}

impl<'a> Runner<'a> {
    pub fn new(
        session: &'a Session,
        rng: Rng,
        terminal: &'a mut dyn Terminal,
        log: &'a mut dyn EventLog,
        clock: &'a dyn Clock,
        limits: RunLimits,
    ) -> Self {
        Self {
            session,
            rng,
            terminal,
            log,
            clock,
            limits,
        }
    }

    /// Run until Ctrl+C.
    ///
    /// The terminal is left on every path out, including errors; an error from
    /// the run itself wins over one from restoring the terminal.
    pub fn run(self) -> RunResult<RunSummary> {
        let Runner {
            session,
            rng,
            terminal,
            log,
            clock,
            limits,
        } = self;

        let mut playback = Playback {
            session,
            terminal,
            log,
            clock,
            limits,
            summary: RunSummary::default(),
        };

        let started = clock.now();
        let result = match playback.terminal.enter() {
            Ok(()) => playback.drive(rng, started),
            Err(e) => Err(e.into()),
        };
        let restored = playback.terminal.leave();

        result?;
        restored?;

        let mut summary = playback.summary;
        summary.elapsed = clock.now().duration_since(started);
        info!(
            prompts = summary.prompts_shown,
            switches = summary.group_switches,
            keys = summary.keys,
            elapsed_secs = summary.elapsed.as_secs(),
            "Session finished"
        );
        Ok(summary)
    }
}

/// Outcome of one wait for an advance key
enum Step {
    Quit,
    Advanced(Vec<CoreEvent>),
}

struct Playback<'a> {
    session: &'a Session,
    terminal: &'a mut dyn Terminal,
    log: &'a mut dyn EventLog,
    clock: &'a dyn Clock,
    limits: RunLimits,
    summary: RunSummary,
}

impl Playback<'_> {
    fn drive(&mut self, rng: Rng, now: MonotonicInstant) -> RunResult<()> {
        let (mut scheduler, events) = Scheduler::start(self.session, rng, now);
        self.play(events)?;

        for _ in 0..self.limits.max_prompts_per_run {
            match self.wait_for_advance(&mut scheduler)? {
                Step::Quit => {
                    debug!("Quit key received");
                    return Ok(());
                }
                Step::Advanced(events) => self.play(events)?,
            }
        }

        error!(
            limit = self.limits.max_prompts_per_run,
            "Display loop exceeded"
        );
        self.log.append(LogEvent::DisplayLoopExceeded)?;
        Err(RunError::DisplayLoopExhausted(
            self.limits.max_prompts_per_run,
        ))
    }

    fn wait_for_advance(&mut self, scheduler: &mut Scheduler<'_>) -> RunResult<Step> {
        for _ in 0..self.limits.max_wait_loops {
            let now = self.clock.now();
            if let Some(event) = scheduler.check_expiry(now) {
                self.play(vec![event])?;
            }

            let Some(key) = self.terminal.read_key(scheduler.key_wait(now))? else {
                continue;
            };
            self.summary.keys += 1;
            self.log.append(LogEvent::Key { key })?;

            match scheduler.handle_key(key, self.clock.now()) {
                KeyOutcome::Quit => return Ok(Step::Quit),
                KeyOutcome::Ignored => {}
                KeyOutcome::Advanced(events) => return Ok(Step::Advanced(events)),
            }
        }

        error!(limit = self.limits.max_wait_loops, "Wait loop exceeded");
        self.log.append(LogEvent::WaitLoopExceeded)?;
        Err(RunError::WaitLoopExhausted(self.limits.max_wait_loops))
    }

    fn play(&mut self, events: Vec<CoreEvent>) -> RunResult<()> {
        for event in events {
            let record = match event {
                CoreEvent::PromptShown { group, item } => {
                    let text = self.session.item_text(item).unwrap_or_default();
                    self.terminal.show_prompt(text)?;
                    self.summary.prompts_shown += 1;
                    LogEvent::PromptShown {
                        group,
                        item,
                        len: text.len(),
                    }
                }
                CoreEvent::GroupSwitched { group } => {
                    self.summary.group_switches += 1;
                    LogEvent::GroupSwitched { group }
                }
                CoreEvent::GroupExpired { group } => LogEvent::GroupExpired { group },
                CoreEvent::GroupsReshuffled => LogEvent::GroupsReshuffled,
                CoreEvent::ItemsReshuffled { group } => LogEvent::ItemsReshuffled { group },
            };
            self.log.append(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cram_config::DeckLimits;
    use cram_deck::parse_session;
    use cram_log::MemoryLog;
    use cram_term_api::{KeyWait, MockInput, MockTerminal, TermError};
    use cram_util::ManualClock;

    fn session(text: &str) -> Session {
        parse_session(text.as_bytes().to_vec(), &DeckLimits::default()).unwrap()
    }

    fn run(
        session: &Session,
        terminal: &mut MockTerminal,
        log: &mut MemoryLog,
        clock: &ManualClock,
        limits: RunLimits,
    ) -> RunResult<RunSummary> {
        Runner::new(session, Rng::from_seed(17), terminal, log, clock, limits).run()
    }

    #[test]
    fn test_quit_immediately() {
        let session = session("[A|5]\none\n[B|5]\ntwo\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::with_keys(&[3], clock.clone());
        let mut log = MemoryLog::new();

        let summary = run(&session, &mut terminal, &mut log, &clock, RunLimits::default()).unwrap();

        assert_eq!(summary.prompts_shown, 1);
        assert_eq!(summary.keys, 1);
        assert_eq!(summary.group_switches, 0);
        assert_eq!((terminal.enter_count(), terminal.leave_count()), (1, 1));
        assert!(!terminal.is_raw());

        let screen = terminal.current_screen().unwrap();
        assert!(screen == b"one" || screen == b"two");

        let events: Vec<&LogEvent> = log.events().collect();
        assert!(matches!(events[0], LogEvent::PromptShown { len: 3, .. }));
        assert_eq!(events[1], &LogEvent::Key { key: 3 });
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_advance_through_items() {
        let session = session("[Only|60]\nalpha\nbeta\ngamma\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::with_keys(b"  \r\n\t3\x03", clock.clone());
        let mut log = MemoryLog::new();

        let summary = run(&session, &mut terminal, &mut log, &clock, RunLimits::default()).unwrap();

        // Space, space, CR, LF and '3' advance; tab does not
        assert_eq!(summary.prompts_shown, 6);
        assert_eq!(summary.keys, 7);
        assert_eq!(log.tagged("key").count(), 7);

        let first_pass: std::collections::HashSet<&[u8]> =
            terminal.screens()[..3].iter().map(Vec::as_slice).collect();
        assert_eq!(first_pass.len(), 3);
        assert_eq!(log.tagged("shuffle").count(), 1);
    }

    #[test]
    fn test_group_switch_needs_expiry_and_key() {
        let session = session("[A|2]\na\n[B|2]\nb\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::new(
            [
                MockInput::Timeout,
                MockInput::Timeout,
                MockInput::Key(b' '),
                MockInput::Key(3),
            ],
            clock.clone(),
        );
        let mut log = MemoryLog::new();

        let summary = run(&session, &mut terminal, &mut log, &clock, RunLimits::default()).unwrap();

        assert_eq!(summary.group_switches, 1);
        assert_eq!(summary.prompts_shown, 2);
        assert_ne!(terminal.screens()[0], terminal.screens()[1]);

        // Waits stay indefinite from expiry until the switch re-arms the timer
        assert_eq!(
            terminal.waits(),
            &[
                KeyWait::Within(Duration::from_secs(2)),
                KeyWait::Indefinite,
                KeyWait::Indefinite,
                KeyWait::Within(Duration::from_secs(2)),
            ]
        );

        let group_records: Vec<&LogEvent> = log.tagged("group").collect();
        assert_eq!(group_records.len(), 2);
        assert!(matches!(group_records[0], LogEvent::GroupExpired { .. }));
        assert!(matches!(group_records[1], LogEvent::GroupSwitched { .. }));
    }

    #[test]
    fn test_key_before_expiry_keeps_group() {
        let session = session("[A|10]\na1\na2\n[B|10]\nb1\nb2\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::new(
            [
                MockInput::KeyAfter(Duration::from_secs(4), b'x'),
                MockInput::KeyAfter(Duration::from_secs(4), b'x'),
                MockInput::Key(3),
            ],
            clock.clone(),
        );
        let mut log = MemoryLog::new();

        let summary = run(&session, &mut terminal, &mut log, &clock, RunLimits::default()).unwrap();

        assert_eq!(summary.group_switches, 0);
        assert_eq!(log.tagged("group").count(), 0);
        assert_eq!(
            terminal.waits(),
            &[
                KeyWait::Within(Duration::from_secs(10)),
                KeyWait::Within(Duration::from_secs(6)),
                KeyWait::Within(Duration::from_secs(2)),
            ]
        );
        assert_eq!(summary.elapsed, Duration::from_secs(8));
    }

    #[test]
    fn test_wait_loop_ceiling() {
        let session = session("[A|5]\nx\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::new([MockInput::Interrupted; 8], clock.clone());
        let mut log = MemoryLog::new();
        let limits = RunLimits {
            max_wait_loops: 4,
            ..Default::default()
        };

        let err = run(&session, &mut terminal, &mut log, &clock, limits).unwrap_err();

        assert!(matches!(err, RunError::WaitLoopExhausted(4)));
        assert_eq!(terminal.remaining_inputs(), 4);
        assert_eq!(terminal.leave_count(), 1);
        assert_eq!(
            log.tagged("error").collect::<Vec<_>>(),
            vec![&LogEvent::WaitLoopExceeded]
        );
    }

    #[test]
    fn test_display_loop_ceiling() {
        let session = session("[A|5]\nx\ny\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::with_keys(&[b' '; 10], clock.clone());
        let mut log = MemoryLog::new();
        let limits = RunLimits {
            max_prompts_per_run: 3,
            ..Default::default()
        };

        let err = run(&session, &mut terminal, &mut log, &clock, limits).unwrap_err();

        assert!(matches!(err, RunError::DisplayLoopExhausted(3)));
        assert_eq!(terminal.screens().len(), 4);
        assert_eq!(terminal.leave_count(), 1);
        assert_eq!(
            log.events().last(),
            Some(&LogEvent::DisplayLoopExceeded)
        );
    }

    #[test]
    fn test_terminal_left_on_error() {
        let session = session("[A|5]\nx\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::with_keys(&[], clock.clone());
        let mut log = MemoryLog::new();

        let err = run(&session, &mut terminal, &mut log, &clock, RunLimits::default()).unwrap_err();

        assert!(matches!(err, RunError::Terminal(TermError::InputClosed)));
        assert_eq!((terminal.enter_count(), terminal.leave_count()), (1, 1));
        assert!(!terminal.is_raw());
    }

    #[test]
    fn test_run_error_wins_over_restore_error() {
        let session = session("[A|5]\nx\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::with_keys(&[], clock.clone());
        terminal.fail_show = true;
        terminal.fail_leave = true;
        let mut log = MemoryLog::new();

        let err = run(&session, &mut terminal, &mut log, &clock, RunLimits::default()).unwrap_err();
        assert!(matches!(err, RunError::Terminal(TermError::Write(_))));
        assert_eq!(terminal.leave_count(), 1);
    }

    #[test]
    fn test_restore_error_reported() {
        let session = session("[A|5]\nx\n");
        let clock = ManualClock::new();
        let mut terminal = MockTerminal::with_keys(&[3], clock.clone());
        terminal.fail_leave = true;
        let mut log = MemoryLog::new();

        let err = run(&session, &mut terminal, &mut log, &clock, RunLimits::default()).unwrap_err();
        assert!(matches!(err, RunError::Terminal(TermError::SetAttributes(_))));
    }
}
