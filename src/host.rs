/// Contract the widget requires from its hosting list surface.
///
/// All flat indices are full list coordinates, header rows included. Range
/// notifications arrive one at a time and only while no animation batch is
/// running; the host never has to reconcile overlapping changes.
pub trait RecyclerHost {
    type Holder;

    /// `count` rows now exist starting at `start`; later rows shifted down.
    fn insert_range(&mut self, start: usize, count: usize);

    /// `count` rows vanished starting at `start`; later rows shifted up.
    fn remove_range(&mut self, start: usize, count: usize);

    /// Rows in the range must be rebound before they are next drawn.
    fn change_range(&mut self, start: usize, count: usize);

    /// Everything changed; drop positional assumptions and rebind.
    fn data_set_changed(&mut self);

    /// Cancels any scroll in progress.
    fn stop_scroll(&mut self);

    /// Flat index of the first row in the viewport, if any.
    fn first_visible(&self) -> Option<usize>;

    /// Flat index of the last fully shown row, if any.
    fn last_completely_visible(&self) -> Option<usize>;

    /// Brings the row at `flat` into view.
    fn smooth_scroll_to(&mut self, flat: usize);

    /// Currently bound holder at `flat`, when that row is materialized.
    fn holder_at(&mut self, flat: usize) -> Option<&mut Self::Holder>;
}
