use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::text::Text;
use ratatui::widgets::{Block, List, ListItem, StatefulWidget, Widget};

use crate::adapter::GroupAdapter;
use crate::animator::ItemAnimator;
use crate::controller::{ExpandController, Request, Task};
use crate::header::{HeaderFooterAdapter, Slot};
use crate::holder::ExpandableHolder;
use crate::host::RecyclerHost;
use crate::recycler::VirtualList;
use crate::source::{ExpandableSource, StableId, StableIdMode};
use crate::style::ExpandableListStyle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packed selected-position value meaning "no selection".
pub const PACKED_POSITION_VALUE_NULL: u64 = u64::MAX;

/// Packs a group index into the selected-position encoding.
#[must_use]
pub const fn packed_position_for_group(group: usize) -> u64 {
    (group as u64) << 32
}

pub(crate) struct SelectedState<Sid> {
    pub group: Option<usize>,
    pub stable_id: Option<StableId<Sid>>,
}

#[derive(Default)]
pub(crate) struct ExpandListeners {
    pub expand: Option<Box<dyn FnMut(usize)>>,
    pub collapse: Option<Box<dyn FnMut(usize)>>,
    pub click: Option<Box<dyn FnMut(usize) -> bool>>,
}

/// Saved widget state: the two stable ids, resolved against fresh data on
/// the next full reload.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct ExpandableListSnapshot<Sid> {
    pub selected_stable_id: Option<StableId<Sid>>,
    pub expanded_stable_id: Option<StableId<Sid>>,
}

/// An expandable group/child list.
///
/// Owns the data source, the expansion and selection state and the task
/// queue that serializes structural changes behind the running animation.
/// Every operation takes the hosting [`RecyclerHost`] and the current time;
/// work that cannot run yet is queued and picked up by a later
/// [`tick`](Self::tick). The [`ExpandableList`] render shell calls `tick`
/// every frame, so applications drawing through it never pump by hand.
pub struct ExpandableListView<S: ExpandableSource> {
    pub(crate) layers: HeaderFooterAdapter<GroupAdapter<S>>,
    pub(crate) controller: ExpandController,
    pub(crate) selected: SelectedState<S::StableId>,
    pub(crate) listeners: ExpandListeners,
    pub(crate) attached: bool,
    #[cfg(feature = "keymap")]
    pub(crate) keymap: crate::keymap::ListKeyBindings,
}

impl<S: ExpandableSource> ExpandableListView<S> {
    pub fn new(source: S) -> Self {
        Self {
            layers: HeaderFooterAdapter::new(GroupAdapter::new(source)),
            controller: ExpandController::new(),
            selected: SelectedState {
                group: None,
                stable_id: None,
            },
            listeners: ExpandListeners::default(),
            attached: false,
            #[cfg(feature = "keymap")]
            keymap: crate::keymap::ListKeyBindings::new(),
        }
    }

    pub fn into_source(self) -> S {
        self.layers.into_delegate().into_source()
    }

    pub fn source(&self) -> &S {
        self.layers.delegate().source()
    }

    /// Mutable access to the data source. Every structural edit must be
    /// followed by the matching `notify_*` call before the next draw.
    pub fn source_mut(&mut self) -> &mut S {
        self.layers.delegate_mut().source_mut()
    }

    pub fn adapter(&self) -> &GroupAdapter<S> {
        self.layers.delegate()
    }

    #[must_use]
    pub fn expanded_position(&self) -> Option<usize> {
        self.layers.delegate().expanded_position()
    }

    /// Payload of the expanded group, if any.
    #[must_use]
    pub fn expanded_group(&self) -> Option<&S::Item> {
        self.layers.delegate().expanded_group()
    }

    #[must_use]
    pub fn selected_group(&self) -> Option<usize> {
        self.selected.group
    }

    /// Selected position in the packed encoding;
    /// [`PACKED_POSITION_VALUE_NULL`] when nothing is selected.
    #[must_use]
    pub fn selected_position(&self) -> u64 {
        self.selected
            .group
            .map_or(PACKED_POSITION_VALUE_NULL, packed_position_for_group)
    }

    /// Total row count, headers and footers included.
    #[must_use]
    pub fn flat_count(&self) -> usize {
        self.layers.item_count()
    }

    #[must_use]
    pub fn header_views_count(&self) -> usize {
        self.layers.header_count()
    }

    #[must_use]
    pub fn footer_views_count(&self) -> usize {
        self.layers.footer_count()
    }

    /// Chooses how group identity survives full reloads.
    ///
    /// # Panics
    ///
    /// Panics once the widget has been used; the mode is part of its
    /// configuration, not its runtime state.
    pub fn set_stable_ids_mode(&mut self, mode: StableIdMode) {
        assert!(
            !self.attached,
            "the stable id mode must be configured before the widget is used"
        );
        self.layers.delegate_mut().set_stable_id_mode(mode);
    }

    #[deprecated(note = "use `set_stable_ids_mode` with an explicit mode")]
    pub fn set_has_stable_ids(&mut self, _has_stable_ids: bool) {
        panic!("use set_stable_ids_mode() instead");
    }

    pub fn set_on_group_expand_listener(&mut self, listener: impl FnMut(usize) + 'static) {
        self.listeners.expand = Some(Box::new(listener));
    }

    pub fn set_on_group_collapse_listener(&mut self, listener: impl FnMut(usize) + 'static) {
        self.listeners.collapse = Some(Box::new(listener));
    }

    /// The click listener runs before the toggle transition; returning
    /// `true` consumes the tap.
    pub fn set_on_group_click_listener(&mut self, listener: impl FnMut(usize) -> bool + 'static) {
        self.listeners.click = Some(Box::new(listener));
    }

    pub fn item_animator(&self) -> &dyn ItemAnimator {
        self.controller.normal_animator()
    }

    pub fn set_item_animator(&mut self, animator: Box<dyn ItemAnimator>) {
        self.controller.set_normal_animator(animator);
    }

    /// Runs queued work that the animation timeline now allows.
    pub fn tick<H>(&mut self, host: &mut H, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        self.attached = true;
        self.controller.pump(
            &mut self.layers,
            &mut self.selected,
            &mut self.listeners,
            host,
            now,
        );
    }

    /// Expands the group, collapsing any other. Expanding the group that is
    /// already expanded collapses it.
    pub fn expand_group<H>(&mut self, host: &mut H, group: usize, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        self.controller.push(Task::Transition(Request::Toggle(group)));
        self.tick(host, now);
    }

    /// Collapses the group if it is the expanded one; otherwise a no-op.
    pub fn collapse_group<H>(&mut self, host: &mut H, group: usize, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        self.controller
            .push(Task::Transition(Request::Collapse(group)));
        self.tick(host, now);
    }

    pub fn collapse_all<H>(&mut self, host: &mut H, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        self.controller.push(Task::Transition(Request::CollapseAll));
        self.tick(host, now);
    }

    pub fn set_selected_group<H>(&mut self, host: &mut H, group: Option<usize>, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        self.controller.push(Task::Select(group));
        self.tick(host, now);
    }

    /// Re-binds the visible window once the animator drains.
    pub fn refresh_display<H>(&mut self, host: &mut H, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        self.controller.push(Task::Refresh);
        self.tick(host, now);
    }

    /// Announces that the group's content changed in place.
    pub fn notify_group_changed<H>(&mut self, host: &mut H, group: usize, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        let range = self.layers.delegate().group_changed(group);
        self.controller.push(Task::Change {
            start: range.start,
            len: range.len,
        });
        self.tick(host, now);
    }

    /// Announces that a group was inserted at `group`. The expanded window
    /// is re-anchored immediately; the host notification waits its turn.
    pub fn notify_group_inserted<H>(&mut self, host: &mut H, group: usize, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        let range = self.layers.delegate_mut().group_inserted(group);
        self.controller.push(Task::Insert {
            start: range.start,
            len: range.len,
        });
        self.tick(host, now);
    }

    /// Announces that the group at `group` was removed.
    pub fn notify_group_removed<H>(&mut self, host: &mut H, group: usize, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        let range = self.layers.delegate_mut().group_removed(group);
        self.controller.push(Task::Remove {
            start: range.start,
            len: range.len,
        });
        self.tick(host, now);
    }

    /// Announces a full reload. Queued work and the in-flight transition are
    /// abandoned; expansion and selection are recovered through stable ids
    /// where the mode allows it.
    pub fn notify_data_changed<H>(&mut self, host: &mut H, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        host.stop_scroll();
        self.controller.abort_in_flight();
        host.data_set_changed();
        self.layers.delegate_mut().recover_after_reload();
        if self.layers.delegate().stable_id_mode() == StableIdMode::Opaque
            && let Some(StableId::Opaque(sid)) = self.selected.stable_id.clone()
        {
            self.selected.group = self.layers.delegate().source().position_of_stable_id(&sid);
        } else if let Some(group) = self.selected.group
            && group >= self.layers.delegate().source().group_count()
        {
            log::debug!("selected group {group} is out of range after reload, clearing");
            self.selected.group = None;
            self.selected.stable_id = None;
        }
        self.tick(host, now);
    }

    /// Routes a tap on the row at `flat` (full list coordinates).
    ///
    /// The holder's own tap hook runs first; a group row that allows
    /// expansion then goes through the click listener and, unless consumed,
    /// toggles.
    pub fn tap<H>(&mut self, host: &mut H, flat: usize, now: Instant) -> bool
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        if flat >= self.layers.item_count() {
            return false;
        }
        let Slot::Item(inner) = self.layers.slot_at(flat) else {
            return false;
        };
        let Some(holder) = host.holder_at(flat) else {
            return false;
        };
        if holder.on_tapped() {
            return true;
        }
        if !holder.can_expand() {
            return false;
        }
        let group = self.layers.delegate().holder_group_position(inner, true);
        self.activate_group(host, group, now);
        true
    }

    /// Toggles the group after consulting the click listener.
    pub fn activate_group<H>(&mut self, host: &mut H, group: usize, now: Instant)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        if let Some(listener) = self.listeners.click.as_mut()
            && listener(group)
        {
            return;
        }
        self.controller.push(Task::Transition(Request::Toggle(group)));
        self.tick(host, now);
    }

    /// Per-item animation event: the add animation of the row at `flat`
    /// finished. Only custom hosts that animate row by row need this.
    pub fn item_add_finished(&mut self, flat: usize) {
        let Some(inner) = flat.checked_sub(self.layers.header_count()) else {
            return;
        };
        let group = self.layers.delegate().holder_group_position(inner, false);
        self.controller.on_add_finished(group, &mut self.listeners);
    }

    /// Per-item animation event: the remove animation of the row at `flat`
    /// finished.
    pub fn item_remove_finished(&mut self, flat: usize) {
        let Some(inner) = flat.checked_sub(self.layers.header_count()) else {
            return;
        };
        let group = self.layers.delegate().holder_group_position(inner, false);
        self.controller
            .on_remove_finished(group, &mut self.listeners);
    }

    pub fn add_header_view<H>(&mut self, host: &mut H, row: Text<'static>)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        self.layers.add_header(row);
        host.data_set_changed();
    }

    pub fn add_footer_view<H>(&mut self, host: &mut H, row: Text<'static>)
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        self.layers.add_footer(row);
        host.data_set_changed();
    }

    pub fn remove_header_view<H>(&mut self, host: &mut H, row: &Text<'static>) -> bool
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        let removed = self.layers.remove_header(row);
        if removed {
            host.data_set_changed();
        }
        removed
    }

    pub fn remove_footer_view<H>(&mut self, host: &mut H, row: &Text<'static>) -> bool
    where
        H: RecyclerHost<Holder = S::Holder>,
    {
        let removed = self.layers.remove_footer(row);
        if removed {
            host.data_set_changed();
        }
        removed
    }

    #[must_use]
    pub fn snapshot(&self) -> ExpandableListSnapshot<S::StableId> {
        ExpandableListSnapshot {
            selected_stable_id: self.selected.stable_id.clone(),
            expanded_stable_id: self.layers.delegate().expanded_stable_id().cloned(),
        }
    }

    /// Stashes a snapshot. The ids take effect on the next
    /// [`notify_data_changed`](Self::notify_data_changed).
    pub fn restore(&mut self, snapshot: ExpandableListSnapshot<S::StableId>) {
        if self.layers.delegate().stable_id_mode() == StableIdMode::None {
            return;
        }
        self.selected.stable_id = snapshot.selected_stable_id;
        self.layers
            .delegate_mut()
            .stash_expanded_stable_id(snapshot.expanded_stable_id);
    }

    /// Binds holders for every visible row that needs it, drawing from the
    /// recycling pool. Bind mismatches are logged and skipped.
    pub fn refresh_viewport(&mut self, list: &mut VirtualList<S::Holder>) {
        list.begin_frame(self.layers.item_count());
        for flat in list.visible_range() {
            let Slot::Item(inner) = self.layers.slot_at(flat) else {
                continue;
            };
            if !list.needs_bind(flat) {
                continue;
            }
            let view_type = self.layers.view_type_at(flat);
            let adapter = self.layers.delegate();
            let mut holder = match list.take(flat) {
                Some(holder) if holder.state().view_type() == view_type => holder,
                Some(stale) => {
                    list.recycle(stale);
                    obtain(list, adapter.source(), view_type)
                }
                None => obtain(list, adapter.source(), view_type),
            };
            if let Err(error) = adapter.bind_holder(&mut holder, inner, self.selected.group) {
                log::error!("{error}");
                debug_assert!(false, "{error}");
            }
            list.put(flat, holder);
        }
    }
}

fn obtain<S: ExpandableSource>(
    list: &mut VirtualList<S::Holder>,
    source: &S,
    view_type: i32,
) -> S::Holder {
    list.pool_take(view_type).unwrap_or_else(|| {
        let mut holder = source.create_holder(view_type);
        holder.state_mut().view_type = view_type;
        holder
    })
}

/// Render shell: pumps the task queue, refreshes the viewport and draws
/// headers, bound holder rows and footers as a ratatui list.
pub struct ExpandableList<'a, S: ExpandableSource> {
    view: &'a mut ExpandableListView<S>,
    style: ExpandableListStyle<'a>,
}

impl<'a, S: ExpandableSource> ExpandableList<'a, S> {
    pub fn new(view: &'a mut ExpandableListView<S>) -> Self {
        Self {
            view,
            style: ExpandableListStyle::default(),
        }
    }

    #[must_use]
    pub fn style(mut self, style: ExpandableListStyle<'a>) -> Self {
        self.style = style;
        self
    }
}

impl<S: ExpandableSource> StatefulWidget for ExpandableList<'_, S> {
    type State = VirtualList<S::Holder>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let mut block = Block::default()
            .borders(self.style.borders)
            .style(self.style.block_style)
            .border_style(self.style.border_style);
        if let Some(title) = self.style.title {
            block = block.title(title);
        }
        let inner = block.inner(area);
        state.set_viewport_height(inner.height as usize);

        self.view.tick(state, Instant::now());
        self.view.refresh_viewport(state);

        let mut rows: Vec<ListItem<'_>> = Vec::with_capacity(state.visible_range().len());
        for flat in state.visible_range() {
            let row = match self.view.layers.slot_at(flat) {
                Slot::Header(index) => ListItem::new(self.view.layers.header(index).clone()),
                Slot::Footer(index) => ListItem::new(self.view.layers.footer(index).clone()),
                Slot::Item(_) => state.holder(flat).map_or_else(
                    || ListItem::new(""),
                    |holder| {
                        let mut row = ListItem::new(holder.line());
                        if holder.state().is_selected() {
                            row = row.style(self.style.highlight_style);
                        }
                        row
                    },
                ),
            };
            rows.push(row);
        }
        Widget::render(List::new(rows).block(block), area, buf);
    }
}
