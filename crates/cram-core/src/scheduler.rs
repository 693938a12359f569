//! Group and prompt scheduling
//!
//! The scheduler decides which single prompt is visible and when the active
//! group changes. It performs no I/O: each operation takes the current
//! monotonic time and returns the [`CoreEvent`]s the runner should play.
//!
//! A group's timer running out never switches groups by itself. It only marks
//! the switch as pending; the next advance key performs it.

use cram_deck::Session;
use cram_term_api::KeyWait;
use cram_util::MonotonicInstant;
use std::time::Duration;
use tracing::debug;

use crate::{CoreEvent, Rng};

/// Ctrl+C as read in raw mode
pub const QUIT_KEY: u8 = 3;

/// Space, CR, LF and ASCII letters and digits move to the next prompt
pub fn is_advance_key(key: u8) -> bool {
    matches!(key, b' ' | b'\r' | b'\n') || key.is_ascii_alphanumeric()
}

/// Result of handling one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// End the run
    Quit,
    /// Not an advance key; nothing changed
    Ignored,
    /// State moved on; play these events
    Advanced(Vec<CoreEvent>),
}

/// Runtime state of one play session
#[derive(Debug)]
pub struct Scheduler<'s> {
    session: &'s Session,
    rng: Rng,

    group_order: Vec<usize>,
    order_pos: usize,
    group: usize,

    /// Absolute item indices of the active group, shuffled
    item_order: Vec<usize>,
    item_pos: usize,

    deadline: MonotonicInstant,
    pending_switch: bool,
}

impl<'s> Scheduler<'s> {
    /// Shuffle the groups, select the first one and its first prompt, and arm
    /// its timer.
    ///
    /// `session` always holds at least one group with at least one item.
    pub fn start(
        session: &'s Session,
        mut rng: Rng,
        now: MonotonicInstant,
    ) -> (Self, Vec<CoreEvent>) {
        let mut group_order: Vec<usize> = (0..session.group_count()).collect();
        rng.shuffle(&mut group_order);
        let group = group_order[0];

        let mut scheduler = Self {
            session,
            rng,
            group_order,
            order_pos: 0,
            group,
            item_order: Vec::new(),
            item_pos: 0,
            deadline: now,
            pending_switch: false,
        };
        scheduler.enter_group(now);

        debug!(
            group = scheduler.group,
            groups = session.group_count(),
            "Scheduler started"
        );

        let events = vec![scheduler.prompt_event()];
        (scheduler, events)
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Index of the active group
    pub fn group(&self) -> usize {
        self.group
    }

    /// Index into the session's items of the prompt on screen
    pub fn item(&self) -> usize {
        self.item_order[self.item_pos]
    }

    pub fn pending_switch(&self) -> bool {
        self.pending_switch
    }

    pub fn deadline(&self) -> MonotonicInstant {
        self.deadline
    }

    /// Time left in the active group, zero once expired
    pub fn remaining(&self, now: MonotonicInstant) -> Duration {
        self.deadline.saturating_duration_until(now)
    }

    /// Arm the pending switch once the active group's time is up
    pub fn check_expiry(&mut self, now: MonotonicInstant) -> Option<CoreEvent> {
        if self.pending_switch || now < self.deadline {
            return None;
        }

        self.pending_switch = true;
        debug!(group = self.group, "Group expired, switch pending");
        Some(CoreEvent::GroupExpired { group: self.group })
    }

    /// How long the runner may block for the next key
    pub fn key_wait(&self, now: MonotonicInstant) -> KeyWait {
        if self.pending_switch {
            KeyWait::Indefinite
        } else {
            KeyWait::Within(self.remaining(now))
        }
    }

    pub fn handle_key(&mut self, key: u8, now: MonotonicInstant) -> KeyOutcome {
        if key == QUIT_KEY {
            return KeyOutcome::Quit;
        }
        if !is_advance_key(key) {
            return KeyOutcome::Ignored;
        }

        let events = if self.pending_switch {
            self.switch_group(now)
        } else {
            self.next_item()
        };
        KeyOutcome::Advanced(events)
    }

    fn switch_group(&mut self, now: MonotonicInstant) -> Vec<CoreEvent> {
        let mut events = Vec::with_capacity(3);

        self.order_pos += 1;
        if self.order_pos >= self.group_order.len() {
            self.rng.shuffle(&mut self.group_order);
            self.order_pos = 0;
            events.push(CoreEvent::GroupsReshuffled);
        }
        self.group = self.group_order[self.order_pos];
        self.pending_switch = false;
        self.enter_group(now);

        debug!(group = self.group, "Switched group");
        events.push(CoreEvent::GroupSwitched { group: self.group });
        events.push(self.prompt_event());
        events
    }

    fn next_item(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::with_capacity(2);

        self.item_pos += 1;
        if self.item_pos >= self.item_order.len() {
            self.rng.shuffle(&mut self.item_order);
            self.item_pos = 0;
            events.push(CoreEvent::ItemsReshuffled { group: self.group });
        }

        events.push(self.prompt_event());
        events
    }

    /// Fresh item order and timer for the active group
    fn enter_group(&mut self, now: MonotonicInstant) {
        let (range, duration) = match self.session.group(self.group) {
            Some(group) => (group.item_range(), group.duration()),
            None => (0..0, Duration::ZERO),
        };

        self.item_order.clear();
        self.item_order.extend(range);
        self.rng.shuffle(&mut self.item_order);
        self.item_pos = 0;
        self.deadline = now + duration;
    }

    fn prompt_event(&self) -> CoreEvent {
        CoreEvent::PromptShown {
            group: self.group,
            item: self.item(),
        }
    }
}
