//! Core events emitted by the scheduler

/// Events emitted by the scheduler, in the order the runner must play them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreEvent {
    /// Draw this item. `item` is an index into the session's items.
    PromptShown { group: usize, item: usize },

    /// The pending switch was acknowledged; `group` is now active
    GroupSwitched { group: usize },

    /// The group's time budget ran out; a switch is pending
    GroupExpired { group: usize },

    /// The group order was exhausted and drawn again
    GroupsReshuffled,

    /// A group's item order was exhausted and drawn again
    ItemsReshuffled { group: usize },
}
