use std::ops::Range;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::holder::ExpandableHolder;
use crate::host::RecyclerHost;

/// Virtualized viewport over the flat row sequence.
///
/// Holders exist only for visible rows; everything scrolled out is parked in
/// a per-view-type pool and handed back out on the next bind. This is the
/// widget's `StatefulWidget` state and the [`RecyclerHost`] the render shell
/// drives.
pub struct VirtualList<H> {
    bound: FxHashMap<usize, H>,
    pool: FxHashMap<i32, Vec<H>>,
    dirty: FxHashSet<usize>,
    offset: usize,
    viewport_height: usize,
    total: usize,
    scroll_target: Option<usize>,
}

impl<H: ExpandableHolder> VirtualList<H> {
    #[must_use]
    pub fn new(viewport_height: usize) -> Self {
        Self {
            bound: FxHashMap::default(),
            pool: FxHashMap::default(),
            dirty: FxHashSet::default(),
            offset: 0,
            viewport_height,
            total: 0,
            scroll_target: None,
        }
    }

    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub const fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
    }

    /// Rows currently in the viewport.
    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.viewport_height).min(self.total);
        self.offset.min(end)..end
    }

    /// Bound holder at `flat`, if that row is materialized.
    #[must_use]
    pub fn holder(&self, flat: usize) -> Option<&H> {
        self.bound.get(&flat)
    }

    /// Applies the pending scroll target, clamps the offset and recycles
    /// holders that fell out of the viewport. Called once per frame with the
    /// current row count.
    pub(crate) fn begin_frame(&mut self, total: usize) {
        self.total = total;
        if let Some(target) = self.scroll_target.take()
            && target < total
        {
            if target < self.offset {
                self.offset = target;
            } else if self.viewport_height > 0 && target >= self.offset + self.viewport_height {
                self.offset = target + 1 - self.viewport_height;
            }
        }
        let max_offset = self.total.saturating_sub(self.viewport_height);
        self.offset = self.offset.min(max_offset);

        let visible = self.visible_range();
        let parked: Vec<usize> = self
            .bound
            .keys()
            .copied()
            .filter(|flat| !visible.contains(flat))
            .collect();
        for flat in parked {
            if let Some(holder) = self.bound.remove(&flat) {
                self.recycle(holder);
            }
        }
        self.dirty.retain(|flat| visible.contains(flat));
    }

    pub(crate) fn needs_bind(&self, flat: usize) -> bool {
        self.dirty.contains(&flat) || !self.bound.contains_key(&flat)
    }

    /// Detaches the holder bound at `flat` for rebinding.
    pub(crate) fn take(&mut self, flat: usize) -> Option<H> {
        self.bound.remove(&flat)
    }

    pub(crate) fn put(&mut self, flat: usize, holder: H) {
        self.dirty.remove(&flat);
        if let Some(stale) = self.bound.insert(flat, holder) {
            self.recycle(stale);
        }
    }

    pub(crate) fn pool_take(&mut self, view_type: i32) -> Option<H> {
        self.pool.get_mut(&view_type).and_then(Vec::pop)
    }

    pub(crate) fn recycle(&mut self, holder: H) {
        self.pool
            .entry(holder.state().view_type())
            .or_default()
            .push(holder);
    }

    fn shift_keys(&mut self, start: usize, delta: isize) {
        let shift = |flat: usize| {
            if flat >= start {
                flat.checked_add_signed(delta).unwrap_or(flat)
            } else {
                flat
            }
        };
        let bound: Vec<(usize, H)> = self.bound.drain().collect();
        self.bound = bound
            .into_iter()
            .map(|(flat, holder)| (shift(flat), holder))
            .collect();
        let dirty = std::mem::take(&mut self.dirty);
        self.dirty = dirty.into_iter().map(shift).collect();
    }
}

impl<H: ExpandableHolder> RecyclerHost for VirtualList<H> {
    type Holder = H;

    fn insert_range(&mut self, start: usize, count: usize) {
        self.shift_keys(start, count as isize);
        self.total += count;
    }

    fn remove_range(&mut self, start: usize, count: usize) {
        for flat in start..start + count {
            if let Some(holder) = self.bound.remove(&flat) {
                self.recycle(holder);
            }
            self.dirty.remove(&flat);
        }
        self.shift_keys(start + count, -(count as isize));
        self.total = self.total.saturating_sub(count);
    }

    fn change_range(&mut self, start: usize, count: usize) {
        self.dirty.extend(start..start + count);
    }

    fn data_set_changed(&mut self) {
        let bound: Vec<H> = self.bound.drain().map(|(_, holder)| holder).collect();
        for holder in bound {
            self.recycle(holder);
        }
        self.dirty.clear();
    }

    fn stop_scroll(&mut self) {
        self.scroll_target = None;
    }

    fn first_visible(&self) -> Option<usize> {
        let visible = self.visible_range();
        if visible.is_empty() {
            None
        } else {
            Some(visible.start)
        }
    }

    fn last_completely_visible(&self) -> Option<usize> {
        let visible = self.visible_range();
        if visible.is_empty() {
            None
        } else {
            Some(visible.end - 1)
        }
    }

    fn smooth_scroll_to(&mut self, flat: usize) {
        self.scroll_target = Some(flat);
    }

    fn holder_at(&mut self, flat: usize) -> Option<&mut H> {
        self.bound.get_mut(&flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holder::HolderState;
    use ratatui::text::Line;

    struct PlainHolder {
        state: HolderState,
        text: String,
    }

    impl PlainHolder {
        fn new(view_type: i32, text: &str) -> Self {
            Self {
                state: HolderState {
                    view_type,
                    ..HolderState::default()
                },
                text: text.to_owned(),
            }
        }
    }

    impl ExpandableHolder for PlainHolder {
        fn state(&self) -> &HolderState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut HolderState {
            &mut self.state
        }

        fn line(&self) -> Line<'_> {
            Line::from(self.text.as_str())
        }
    }

    fn list_with_rows(rows: &[(usize, &str)]) -> VirtualList<PlainHolder> {
        let mut list = VirtualList::new(10);
        for &(flat, text) in rows {
            list.put(flat, PlainHolder::new(0, text));
        }
        list
    }

    #[test]
    fn insert_shifts_bound_rows_down() {
        let mut list = list_with_rows(&[(0, "a"), (1, "b"), (2, "c")]);
        list.insert_range(1, 2);
        assert_eq!(list.holder(0).map(|h| h.text.as_str()), Some("a"));
        assert!(list.holder(1).is_none());
        assert_eq!(list.holder(3).map(|h| h.text.as_str()), Some("b"));
        assert_eq!(list.holder(4).map(|h| h.text.as_str()), Some("c"));
    }

    #[test]
    fn remove_recycles_the_window_and_shifts_up() {
        let mut list = list_with_rows(&[(0, "a"), (1, "b"), (2, "c"), (3, "d")]);
        list.remove_range(1, 2);
        assert_eq!(list.holder(0).map(|h| h.text.as_str()), Some("a"));
        assert_eq!(list.holder(1).map(|h| h.text.as_str()), Some("d"));
        assert!(list.holder(2).is_none());
        // the removed holders are back in the pool for their view type
        assert!(list.pool_take(0).is_some());
        assert!(list.pool_take(0).is_some());
        assert!(list.pool_take(0).is_none());
    }

    #[test]
    fn change_marks_rows_for_rebinding() {
        let mut list = list_with_rows(&[(0, "a"), (1, "b")]);
        assert!(!list.needs_bind(0));
        list.change_range(0, 1);
        assert!(list.needs_bind(0));
        assert!(!list.needs_bind(1));
        list.put(0, PlainHolder::new(0, "a2"));
        assert!(!list.needs_bind(0));
    }

    #[test]
    fn data_set_changed_recycles_everything() {
        let mut list = list_with_rows(&[(0, "a"), (1, "b")]);
        list.data_set_changed();
        assert!(list.holder(0).is_none());
        assert!(list.needs_bind(0));
        assert!(list.pool_take(0).is_some());
    }

    #[test]
    fn begin_frame_recycles_rows_outside_the_viewport() {
        let mut list = list_with_rows(&[(0, "a"), (5, "f")]);
        list.set_viewport_height(3);
        list.begin_frame(20);
        assert!(list.holder(0).is_some());
        assert!(list.holder(5).is_none());
        assert!(list.pool_take(0).is_some());
    }

    #[test]
    fn scroll_target_moves_the_offset_into_view() {
        let mut list: VirtualList<PlainHolder> = VirtualList::new(4);
        list.smooth_scroll_to(9);
        list.begin_frame(20);
        assert_eq!(list.visible_range(), 6..10);
        assert_eq!(list.first_visible(), Some(6));
        assert_eq!(list.last_completely_visible(), Some(9));

        list.smooth_scroll_to(2);
        list.begin_frame(20);
        assert_eq!(list.visible_range(), 2..6);
    }

    #[test]
    fn stop_scroll_discards_the_pending_target() {
        let mut list: VirtualList<PlainHolder> = VirtualList::new(4);
        list.smooth_scroll_to(15);
        list.stop_scroll();
        list.begin_frame(20);
        assert_eq!(list.offset(), 0);
    }

    #[test]
    fn offset_clamps_to_the_tail() {
        let mut list: VirtualList<PlainHolder> = VirtualList::new(4);
        list.set_offset(50);
        list.begin_frame(6);
        assert_eq!(list.visible_range(), 2..6);
    }
}
