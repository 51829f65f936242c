use std::time::{Duration, Instant};

/// What a structural batch animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchKind {
    Add,
    Remove,
    Change,
}

/// Contract for the collaborator that interpolates between flat sequences.
///
/// The widget never draws frames of an animation; it only needs to know how
/// long a batch keeps the list in motion so structural changes can wait their
/// turn. `is_running` is the only synchronization primitive in the crate.
pub trait ItemAnimator {
    fn add_duration(&self) -> Duration;
    fn remove_duration(&self) -> Duration;
    fn move_duration(&self) -> Duration;
    fn change_duration(&self) -> Duration;

    /// Records that a structural batch was dispatched at `now`.
    fn begin_batch(&mut self, kind: BatchKind, now: Instant);

    /// Whether any batch is still in flight at `now`.
    fn is_running(&self, now: Instant) -> bool;
}

/// Deadline-tracking animator used outside expand/collapse transitions.
///
/// Durations default to the conventional 120 ms add/remove and 250 ms
/// move/change. Adds and removes displace their neighbors, so their batch
/// window is stretched to cover the move.
#[derive(Clone, Copy, Debug)]
pub struct DefaultItemAnimator {
    add_duration: Duration,
    remove_duration: Duration,
    move_duration: Duration,
    change_duration: Duration,
    deadline: Option<Instant>,
}

impl DefaultItemAnimator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            add_duration: Duration::from_millis(120),
            remove_duration: Duration::from_millis(120),
            move_duration: Duration::from_millis(250),
            change_duration: Duration::from_millis(250),
            deadline: None,
        }
    }
}

impl Default for DefaultItemAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemAnimator for DefaultItemAnimator {
    fn add_duration(&self) -> Duration {
        self.add_duration
    }

    fn remove_duration(&self) -> Duration {
        self.remove_duration
    }

    fn move_duration(&self) -> Duration {
        self.move_duration
    }

    fn change_duration(&self) -> Duration {
        self.change_duration
    }

    fn begin_batch(&mut self, kind: BatchKind, now: Instant) {
        let duration = match kind {
            BatchKind::Add => self.add_duration.max(self.move_duration),
            BatchKind::Remove => self.remove_duration.max(self.move_duration),
            BatchKind::Change => self.change_duration,
        };
        let end = now + duration;
        self.deadline = Some(self.deadline.map_or(end, |deadline| deadline.max(end)));
    }

    fn is_running(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }
}

pub(crate) const EXPAND_MOVE_DURATION: Duration = Duration::from_millis(200);

/// One-shot animator installed for the span of a single expand/collapse
/// transition.
///
/// Child rows appear and vanish instantly; the rows around them slide over
/// 200 ms. The animator also tracks the listener obligations of the
/// transition: each side fires at most once, whether through a per-item
/// finish event or through the drain hook.
#[derive(Debug)]
pub struct ExpandAnimator {
    expand_position: Option<usize>,
    collapse_position: Option<usize>,
    expand_fired: bool,
    collapse_fired: bool,
    deadline: Option<Instant>,
}

impl ExpandAnimator {
    #[must_use]
    pub fn new(expand_position: Option<usize>, collapse_position: Option<usize>) -> Self {
        Self {
            expand_position,
            collapse_position,
            expand_fired: expand_position.is_none(),
            collapse_fired: collapse_position.is_none(),
            deadline: None,
        }
    }

    #[must_use]
    pub const fn expand_position(&self) -> Option<usize> {
        self.expand_position
    }

    #[must_use]
    pub const fn collapse_position(&self) -> Option<usize> {
        self.collapse_position
    }

    /// Claims the expand notification for `holder_group`, at most once.
    pub(crate) fn take_expand_fire(&mut self, holder_group: usize) -> Option<usize> {
        if !self.expand_fired && self.expand_position == Some(holder_group) {
            self.expand_fired = true;
            self.expand_position
        } else {
            None
        }
    }

    /// Claims the collapse notification for `holder_group`, at most once.
    pub(crate) fn take_collapse_fire(&mut self, holder_group: usize) -> Option<usize> {
        if !self.collapse_fired && self.collapse_position == Some(holder_group) {
            self.collapse_fired = true;
            self.collapse_position
        } else {
            None
        }
    }

    /// Remaining listener obligations, claimed at drain time.
    pub(crate) fn drain_unfired(&mut self) -> (Option<usize>, Option<usize>) {
        let expand = if self.expand_fired {
            None
        } else {
            self.expand_fired = true;
            self.expand_position
        };
        let collapse = if self.collapse_fired {
            None
        } else {
            self.collapse_fired = true;
            self.collapse_position
        };
        (expand, collapse)
    }
}

impl ItemAnimator for ExpandAnimator {
    fn add_duration(&self) -> Duration {
        Duration::ZERO
    }

    fn remove_duration(&self) -> Duration {
        Duration::ZERO
    }

    fn move_duration(&self) -> Duration {
        EXPAND_MOVE_DURATION
    }

    fn change_duration(&self) -> Duration {
        EXPAND_MOVE_DURATION
    }

    fn begin_batch(&mut self, _kind: BatchKind, now: Instant) {
        // adds and removes are instant; the move window carries the batch
        let end = now + EXPAND_MOVE_DURATION;
        self.deadline = Some(self.deadline.map_or(end, |deadline| deadline.max(end)));
    }

    fn is_running(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }
}
