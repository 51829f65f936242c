use std::collections::VecDeque;
use std::time::Instant;

use crate::adapter::GroupAdapter;
use crate::animator::{BatchKind, DefaultItemAnimator, EXPAND_MOVE_DURATION, ExpandAnimator, ItemAnimator};
use crate::header::HeaderFooterAdapter;
use crate::holder::{self, ExpandableHolder};
use crate::host::RecyclerHost;
use crate::source::ExpandableSource;
use crate::widget::{ExpandListeners, SelectedState};

/// A transition intent. Resolved against the expanded position at execution
/// time, so queued intents compose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Request {
    Toggle(usize),
    Collapse(usize),
    CollapseAll,
}

/// Deferred work. Tasks run in order, each waiting for the animator to drain.
///
/// Range starts are delegate coordinates; the header offset is applied when
/// the task executes, since headers may come and go while a task waits.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Task {
    Transition(Request),
    Select(Option<usize>),
    Change { start: usize, len: usize },
    Insert { start: usize, len: usize },
    Remove { start: usize, len: usize },
    Refresh,
    FinishTransition {
        due: Instant,
        expand: Option<usize>,
        collapse: Option<usize>,
    },
}

/// Serializes structural changes behind the running animator.
///
/// While a transition is in flight the one-shot [`ExpandAnimator`] stands in
/// for the normal animator; `FinishTransition` settles the listener and
/// holder-flag obligations and restores it.
pub(crate) struct ExpandController {
    queue: VecDeque<Task>,
    normal: Box<dyn ItemAnimator>,
    transition: Option<ExpandAnimator>,
}

impl ExpandController {
    pub(crate) fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            normal: Box::new(DefaultItemAnimator::new()),
            transition: None,
        }
    }

    pub(crate) fn push(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    pub(crate) fn normal_animator(&self) -> &dyn ItemAnimator {
        &*self.normal
    }

    pub(crate) fn set_normal_animator(&mut self, animator: Box<dyn ItemAnimator>) {
        self.normal = animator;
    }

    /// Drops queued work and the in-flight transition. Unfired listeners are
    /// abandoned along with it.
    pub(crate) fn abort_in_flight(&mut self) {
        if !self.queue.is_empty() || self.transition.is_some() {
            log::debug!(
                "aborting {} queued task(s) and the in-flight transition",
                self.queue.len()
            );
        }
        self.queue.clear();
        self.transition = None;
    }

    fn active(&self) -> &dyn ItemAnimator {
        self.transition
            .as_ref()
            .map_or(&*self.normal, |animator| animator as &dyn ItemAnimator)
    }

    fn active_mut(&mut self) -> &mut dyn ItemAnimator {
        match self.transition.as_mut() {
            Some(animator) => animator,
            None => &mut *self.normal,
        }
    }

    /// Routes a per-item add-finished animation event.
    pub(crate) fn on_add_finished(&mut self, holder_group: usize, listeners: &mut ExpandListeners) {
        if let Some(animator) = self.transition.as_mut()
            && let Some(position) = animator.take_expand_fire(holder_group)
            && let Some(listener) = listeners.expand.as_mut()
        {
            listener(position);
        }
    }

    /// Routes a per-item remove-finished animation event.
    pub(crate) fn on_remove_finished(
        &mut self,
        holder_group: usize,
        listeners: &mut ExpandListeners,
    ) {
        if let Some(animator) = self.transition.as_mut()
            && let Some(position) = animator.take_collapse_fire(holder_group)
            && let Some(listener) = listeners.collapse.as_mut()
        {
            listener(position);
        }
    }

    /// Runs queued tasks until one has to wait for the animator.
    pub(crate) fn pump<S, H>(
        &mut self,
        layers: &mut HeaderFooterAdapter<GroupAdapter<S>>,
        selected: &mut SelectedState<S::StableId>,
        listeners: &mut ExpandListeners,
        host: &mut H,
        now: Instant,
    ) where
        S: ExpandableSource,
        H: RecyclerHost<Holder = S::Holder>,
    {
        loop {
            let Some(task) = self.queue.front().copied() else {
                return;
            };
            if self.active().is_running(now) {
                return;
            }
            if let Task::FinishTransition { due, .. } = task
                && now < due
            {
                return;
            }
            self.queue.pop_front();
            match task {
                Task::Transition(request) => self.run_transition(layers, host, request, now),
                Task::Select(group) => self.run_select(layers, selected, host, group, now),
                Task::Change { start, len } => {
                    let start = start + layers.header_count();
                    self.dispatch(host, BatchKind::Change, start, len, now);
                }
                Task::Insert { start, len } => {
                    let start = start + layers.header_count();
                    self.dispatch(host, BatchKind::Add, start, len, now);
                }
                Task::Remove { start, len } => {
                    let start = start + layers.header_count();
                    self.dispatch(host, BatchKind::Remove, start, len, now);
                }
                Task::Refresh => self.run_refresh(host, now),
                Task::FinishTransition {
                    expand, collapse, ..
                } => self.finish_transition(layers, listeners, host, expand, collapse),
            }
        }
    }

    fn dispatch<H: RecyclerHost>(
        &mut self,
        host: &mut H,
        kind: BatchKind,
        start: usize,
        len: usize,
        now: Instant,
    ) {
        if len == 0 {
            return;
        }
        match kind {
            BatchKind::Add => host.insert_range(start, len),
            BatchKind::Remove => host.remove_range(start, len),
            BatchKind::Change => host.change_range(start, len),
        }
        self.active_mut().begin_batch(kind, now);
    }

    /// Resolves the intent, installs the one-shot animator and emits the
    /// structural batches of the transition.
    fn run_transition<S, H>(
        &mut self,
        layers: &mut HeaderFooterAdapter<GroupAdapter<S>>,
        host: &mut H,
        request: Request,
        now: Instant,
    ) where
        S: ExpandableSource,
        H: RecyclerHost<Holder = S::Holder>,
    {
        let header_count = layers.header_count();
        let adapter = layers.delegate_mut();
        let current = adapter.expanded_position();
        let (expand, collapse) = match request {
            Request::Toggle(group) if current == Some(group) => (None, Some(group)),
            Request::Toggle(group) => (Some(group), current),
            Request::Collapse(group) => (None, Some(group)),
            Request::CollapseAll => (None, current),
        };
        // drop sides that cannot apply, so they owe no listener call
        let collapse = collapse.filter(|&group| current == Some(group));
        let expand = expand.filter(|&group| group < adapter.source().group_count());
        log::debug!("transition: expand={expand:?} collapse={collapse:?} (current {current:?})");

        self.transition = Some(ExpandAnimator::new(expand, collapse));

        let mut changed = false;
        if let Some(group) = collapse {
            let start = group + header_count + 1;
            let len = adapter.expanded_child_count();
            adapter.set_expanded_position(None);
            self.dispatch(host, BatchKind::Remove, start, len, now);
            changed = true;
        }
        if let Some(group) = expand
            && adapter.set_expanded_position(Some(group))
        {
            let len = adapter.expanded_child_count();
            self.dispatch(host, BatchKind::Add, group + header_count + 1, len, now);
            changed = true;
        }

        if changed {
            // runs before anything queued after the request
            self.queue.push_front(Task::FinishTransition {
                due: now + EXPAND_MOVE_DURATION,
                expand,
                collapse,
            });
        } else {
            // the intent resolved to a no-op; the one-shot has nothing to do
            self.transition = None;
        }
    }

    /// Settles a finished transition: fires whatever the per-item events did
    /// not, flips the expanded flag on the visible holders and reveals the
    /// new children.
    fn finish_transition<S, H>(
        &mut self,
        layers: &HeaderFooterAdapter<GroupAdapter<S>>,
        listeners: &mut ExpandListeners,
        host: &mut H,
        expand: Option<usize>,
        collapse: Option<usize>,
    ) where
        S: ExpandableSource,
        H: RecyclerHost<Holder = S::Holder>,
    {
        let Some(mut animator) = self.transition.take() else {
            return;
        };
        let (expand_unfired, collapse_unfired) = animator.drain_unfired();
        if let Some(position) = collapse_unfired
            && let Some(listener) = listeners.collapse.as_mut()
        {
            listener(position);
        }
        if let Some(position) = expand_unfired
            && let Some(listener) = listeners.expand.as_mut()
        {
            listener(position);
        }

        let header_count = layers.header_count();
        if let Some(group) = collapse
            && let Some(holder) = host.holder_at(group + header_count)
        {
            holder::set_expanded_flag(holder, false, false);
        }
        if let Some(group) = expand {
            if let Some(holder) = host.holder_at(group + header_count) {
                holder::set_expanded_flag(holder, true, false);
            }
            let children = layers.delegate().expanded_child_count();
            let last_child = group + header_count + children;
            if let (Some(first), Some(last)) = (host.first_visible(), host.last_completely_visible())
                && first < group + header_count
                && last < last_child
            {
                host.smooth_scroll_to(last_child);
            }
        }
    }

    /// Moves the selection, repainting the affected group windows.
    fn run_select<S, H>(
        &mut self,
        layers: &HeaderFooterAdapter<GroupAdapter<S>>,
        selected: &mut SelectedState<S::StableId>,
        host: &mut H,
        group: Option<usize>,
        now: Instant,
    ) where
        S: ExpandableSource,
        H: RecyclerHost<Holder = S::Holder>,
    {
        if selected.group == group {
            return;
        }
        let header_count = layers.header_count();
        if let Some(previous) = selected.group {
            let flat = layers.delegate().flat_of_group(previous) + header_count;
            if let Some(holder) = host.holder_at(flat) {
                holder.state_mut().selected = false;
                let range = layers.delegate().group_changed(previous);
                self.dispatch(host, BatchKind::Change, range.start + header_count, range.len, now);
            }
        }
        selected.group = group;
        selected.stable_id = group.and_then(|g| layers.delegate().stable_id_of(g));
        if let Some(current) = group {
            let flat = layers.delegate().flat_of_group(current) + header_count;
            if let Some(holder) = host.holder_at(flat) {
                holder.state_mut().selected = true;
                let range = layers.delegate().group_changed(current);
                self.dispatch(host, BatchKind::Change, range.start + header_count, range.len, now);
            }
        }
    }

    /// Repaints the visible window.
    fn run_refresh<H: RecyclerHost>(&mut self, host: &mut H, now: Instant) {
        if let (Some(first), Some(last)) = (host.first_visible(), host.last_completely_visible()) {
            self.dispatch(host, BatchKind::Change, first, last - first + 1, now);
        }
    }
}
