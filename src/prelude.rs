pub use crate::{
    BindMismatch, DefaultItemAnimator, ExpandableHolder, ExpandableList, ExpandableListSnapshot,
    ExpandableListStyle, ExpandableListView, ExpandableSource, FlatPos, GroupAdapter,
    HolderState, ItemAnimator, RecyclerHost, StableId, StableIdMode, VirtualList,
    packed_position_for_group,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, ListAction, ListKeyBindings};
