use ratatui::text::Line;

/// Flags the adapter mirrors onto a bound row.
#[derive(Clone, Copy, Debug, Default)]
pub struct HolderState {
    pub(crate) expanded: bool,
    pub(crate) selected: bool,
    /// View type code the holder was created for.
    pub(crate) view_type: i32,
}

impl HolderState {
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    #[must_use]
    pub const fn view_type(&self) -> i32 {
        self.view_type
    }
}

/// A recyclable row holder.
///
/// Holders are created per view type, kept in a pool, and rebound as the
/// viewport moves. The widget drives the [`HolderState`] flags; the holder
/// turns its bound content into a [`Line`] for rendering.
pub trait ExpandableHolder {
    fn state(&self) -> &HolderState;
    fn state_mut(&mut self) -> &mut HolderState;

    /// Row content for the current binding.
    fn line(&self) -> Line<'_>;

    /// Whether a tap on this row may toggle expansion. Off by default.
    fn can_expand(&self) -> bool {
        false
    }

    /// Called after the expanded flag flips.
    fn on_expanded_changed(&mut self) {}

    /// First crack at a tap. Return `true` to consume the event.
    fn on_tapped(&mut self) -> bool {
        false
    }
}

/// Flips the expanded flag and notifies the holder. `force` notifies even
/// when the flag value did not change, which rebinding relies on.
pub(crate) fn set_expanded_flag<H: ExpandableHolder>(holder: &mut H, expanded: bool, force: bool) {
    if force || holder.state().expanded != expanded {
        holder.state_mut().expanded = expanded;
        holder.on_expanded_changed();
    }
}
