use crate::holder::ExpandableHolder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How group identity is tracked across full reloads.
///
/// The mode is part of the adapter configuration and must be chosen before
/// the widget is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StableIdMode {
    /// No stable ids; expanded and selected positions are not recovered.
    #[default]
    None,
    /// Legacy `i64` ids. Positions are kept as-is across reloads.
    Integral,
    /// Opaque ids, resolved back to positions through
    /// [`ExpandableSource::position_of_stable_id`].
    Opaque,
}

/// A group identity that survives full reloads.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StableId<Sid> {
    Integral(i64),
    Opaque(Sid),
}

/// Data contract the application supplies to the widget.
///
/// Groups are addressed by index, children by `(group, child)`. View type
/// codes identify which kind of holder a row needs for recycling purposes;
/// they must be non-negative and, while header or footer rows are installed,
/// must stay out of the reserved window starting at
/// [`HEADER_VIEW_TYPE_OFFSET`](crate::HEADER_VIEW_TYPE_OFFSET).
pub trait ExpandableSource {
    /// Domain payload of a group.
    type Item;
    /// Opaque stable id type, used in [`StableIdMode::Opaque`].
    type StableId: Clone + PartialEq;
    /// Row holder produced for this source.
    type Holder: ExpandableHolder;

    /// Number of groups in the data set.
    fn group_count(&self) -> usize;
    /// Number of children under the group.
    fn children_count(&self, group: usize) -> usize;
    /// View type code of the group row. Must be non-negative.
    fn group_view_type(&self, group: usize) -> i32;
    /// View type code of the child row. Must be non-negative.
    fn child_view_type(&self, group: usize, child: usize) -> i32;
    /// Creates a fresh holder for the view type.
    fn create_holder(&self, view_type: i32) -> Self::Holder;
    /// Fills the holder with the group's content.
    fn bind_group(&self, holder: &mut Self::Holder, group: usize);
    /// Fills the holder with the child's content.
    fn bind_child(&self, holder: &mut Self::Holder, group: usize, child: usize);
    /// Returns the group payload.
    fn group(&self, group: usize) -> &Self::Item;

    /// Stable id of the group, when [`StableIdMode::Opaque`] is used.
    fn group_stable_id(&self, _group: usize) -> Option<Self::StableId> {
        None
    }

    /// Resolves a stable id back to the group position after a reload.
    fn position_of_stable_id(&self, _id: &Self::StableId) -> Option<usize> {
        None
    }

    /// Legacy integral id of the group, when [`StableIdMode::Integral`] is used.
    fn group_integral_id(&self, _group: usize) -> Option<i64> {
        None
    }
}
