//! Expandable group/child list widget for ratatui with a recycling adapter core.
//!
//! At most one group is expanded at a time; expanding splices the group's
//! children into the flat row sequence right below it. Structural changes are
//! serialized behind the running animation window, and expansion/selection
//! survive full reloads through stable ids.
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `ExpandableListView::handle_key`.
//! - `serde`: serde support for `ExpandableListSnapshot`.

mod adapter;
mod animator;
mod controller;
mod error;
mod header;
mod holder;
mod host;
#[cfg(feature = "keymap")]
mod keymap;
pub mod prelude;
mod recycler;
mod source;
mod style;
mod widget;

pub use adapter::{FlatPos, GroupAdapter};
pub use animator::{BatchKind, DefaultItemAnimator, ExpandAnimator, ItemAnimator};
pub use error::BindMismatch;
pub use header::{FlatAdapter, HEADER_VIEW_TYPE_OFFSET, HeaderFooterAdapter, Slot};
pub use holder::{ExpandableHolder, HolderState};
pub use host::RecyclerHost;
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, ListAction, ListKeyBindings};
pub use recycler::VirtualList;
pub use source::{ExpandableSource, StableId, StableIdMode};
pub use style::ExpandableListStyle;
pub use widget::{
    ExpandableList, ExpandableListSnapshot, ExpandableListView, PACKED_POSITION_VALUE_NULL,
    packed_position_for_group,
};
