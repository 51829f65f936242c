use ratatui::text::Text;
use smallvec::SmallVec;

/// First view type code reserved for header and footer rows.
pub const HEADER_VIEW_TYPE_OFFSET: i32 = 7000;

/// Flat-index surface the header/footer wrapper composes around.
pub trait FlatAdapter {
    fn flat_count(&self) -> usize;
    fn view_type_at(&self, flat: usize) -> i32;
}

/// Where a flat index lands once headers and footers are laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Header(usize),
    /// Delegate row, carrying the delegate-relative flat index.
    Item(usize),
    Footer(usize),
}

/// Composes fixed header and footer rows around a delegate adapter.
///
/// The flat layout is `headers, delegate rows, footers`; every delegate index
/// is offset by the header count. View types in
/// `[HEADER_VIEW_TYPE_OFFSET, HEADER_VIEW_TYPE_OFFSET + headers + footers)`
/// belong to the wrapper's own rows; a delegate view type inside that window
/// while it is non-empty is a programming error.
pub struct HeaderFooterAdapter<A> {
    delegate: A,
    headers: SmallVec<[Text<'static>; 2]>,
    footers: SmallVec<[Text<'static>; 2]>,
}

impl<A: FlatAdapter> HeaderFooterAdapter<A> {
    pub(crate) fn new(delegate: A) -> Self {
        Self {
            delegate,
            headers: SmallVec::new(),
            footers: SmallVec::new(),
        }
    }

    pub(crate) const fn delegate(&self) -> &A {
        &self.delegate
    }

    pub(crate) const fn delegate_mut(&mut self) -> &mut A {
        &mut self.delegate
    }

    pub(crate) fn into_delegate(self) -> A {
        self.delegate
    }

    #[must_use]
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn footer_count(&self) -> usize {
        self.footers.len()
    }

    /// Total row count: headers, delegate rows and footers.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.headers.len() + self.footers.len() + self.delegate.flat_count()
    }

    pub(crate) fn add_header(&mut self, row: Text<'static>) {
        self.headers.push(row);
    }

    pub(crate) fn add_footer(&mut self, row: Text<'static>) {
        self.footers.push(row);
    }

    /// Removes the first header equal to `row`.
    pub(crate) fn remove_header(&mut self, row: &Text<'static>) -> bool {
        if let Some(index) = self.headers.iter().position(|header| header == row) {
            self.headers.remove(index);
            true
        } else {
            false
        }
    }

    /// Removes the first footer equal to `row`.
    pub(crate) fn remove_footer(&mut self, row: &Text<'static>) -> bool {
        if let Some(index) = self.footers.iter().position(|footer| footer == row) {
            self.footers.remove(index);
            true
        } else {
            false
        }
    }

    pub(crate) fn header(&self, index: usize) -> &Text<'static> {
        &self.headers[index]
    }

    pub(crate) fn footer(&self, index: usize) -> &Text<'static> {
        &self.footers[index]
    }

    /// Routes a flat index to the row kind that owns it.
    ///
    /// Indices past the end land in `Footer` with an out-of-range offset;
    /// callers bound-check against [`item_count`](Self::item_count).
    #[must_use]
    pub fn slot_at(&self, flat: usize) -> Slot {
        if flat < self.headers.len() {
            return Slot::Header(flat);
        }
        let rest = flat - self.headers.len();
        if rest < self.delegate.flat_count() {
            return Slot::Item(rest);
        }
        Slot::Footer(rest - self.delegate.flat_count())
    }

    /// View type code of the row at `flat`.
    ///
    /// # Panics
    ///
    /// Panics when the delegate reports a view type inside the reserved
    /// header/footer window while that window is non-empty.
    #[must_use]
    pub fn view_type_at(&self, flat: usize) -> i32 {
        match self.slot_at(flat) {
            Slot::Header(index) => HEADER_VIEW_TYPE_OFFSET + index as i32,
            Slot::Footer(index) => {
                HEADER_VIEW_TYPE_OFFSET + (self.headers.len() + index) as i32
            }
            Slot::Item(inner) => {
                let view_type = self.delegate.view_type_at(inner);
                let reserved = (self.headers.len() + self.footers.len()) as i32;
                assert!(
                    reserved == 0
                        || view_type < HEADER_VIEW_TYPE_OFFSET
                        || view_type >= HEADER_VIEW_TYPE_OFFSET + reserved,
                    "delegate view type {view_type} collides with the reserved header/footer window"
                );
                view_type
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRows {
        count: usize,
        view_type: i32,
    }

    impl FlatAdapter for FixedRows {
        fn flat_count(&self) -> usize {
            self.count
        }

        fn view_type_at(&self, _flat: usize) -> i32 {
            self.view_type
        }
    }

    fn wrapped() -> HeaderFooterAdapter<FixedRows> {
        let mut adapter = HeaderFooterAdapter::new(FixedRows {
            count: 3,
            view_type: 1,
        });
        adapter.add_header(Text::raw("top"));
        adapter.add_header(Text::raw("subtitle"));
        adapter.add_footer(Text::raw("bottom"));
        adapter
    }

    #[test]
    fn layout_is_headers_then_delegate_then_footers() {
        let adapter = wrapped();
        assert_eq!(adapter.item_count(), 6);
        assert_eq!(adapter.slot_at(0), Slot::Header(0));
        assert_eq!(adapter.slot_at(1), Slot::Header(1));
        assert_eq!(adapter.slot_at(2), Slot::Item(0));
        assert_eq!(adapter.slot_at(4), Slot::Item(2));
        assert_eq!(adapter.slot_at(5), Slot::Footer(0));
    }

    #[test]
    fn reserved_window_covers_headers_and_footers() {
        let adapter = wrapped();
        assert_eq!(adapter.view_type_at(0), HEADER_VIEW_TYPE_OFFSET);
        assert_eq!(adapter.view_type_at(1), HEADER_VIEW_TYPE_OFFSET + 1);
        assert_eq!(adapter.view_type_at(5), HEADER_VIEW_TYPE_OFFSET + 2);
        assert_eq!(adapter.view_type_at(3), 1);
    }

    #[test]
    #[should_panic(expected = "reserved header/footer window")]
    fn delegate_view_type_in_reserved_window_panics() {
        let mut adapter = HeaderFooterAdapter::new(FixedRows {
            count: 1,
            view_type: HEADER_VIEW_TYPE_OFFSET,
        });
        adapter.add_header(Text::raw("top"));
        let _ = adapter.view_type_at(1);
    }

    #[test]
    fn delegate_may_use_offset_view_types_without_headers() {
        let adapter = HeaderFooterAdapter::new(FixedRows {
            count: 1,
            view_type: HEADER_VIEW_TYPE_OFFSET + 1,
        });
        assert_eq!(adapter.view_type_at(0), HEADER_VIEW_TYPE_OFFSET + 1);
    }

    #[test]
    fn remove_header_matches_by_equality() {
        let mut adapter = wrapped();
        assert!(adapter.remove_header(&Text::raw("subtitle")));
        assert!(!adapter.remove_header(&Text::raw("subtitle")));
        assert_eq!(adapter.header_count(), 1);
    }

    #[test]
    fn remove_footer_removes_the_footer() {
        let mut adapter = wrapped();
        assert!(adapter.remove_footer(&Text::raw("bottom")));
        assert_eq!(adapter.footer_count(), 0);
        assert_eq!(adapter.header_count(), 2);
    }

    #[test]
    fn remove_footer_ignores_header_rows() {
        let mut adapter = wrapped();
        assert!(!adapter.remove_footer(&Text::raw("top")));
        assert_eq!(adapter.header_count(), 2);
        assert_eq!(adapter.footer_count(), 1);
    }

    #[test]
    fn past_the_end_lands_in_footer_space() {
        let adapter = wrapped();
        assert_eq!(adapter.slot_at(7), Slot::Footer(2));
    }
}
