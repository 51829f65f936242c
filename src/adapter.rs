use crate::error::BindMismatch;
use crate::header::FlatAdapter;
use crate::holder::{self, ExpandableHolder};
use crate::source::{ExpandableSource, StableId, StableIdMode};

/// Logical coordinates behind a flat index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlatPos {
    Group(usize),
    Child { group: usize, child: usize },
}

/// A contiguous run of flat rows, in delegate coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FlatRange {
    pub start: usize,
    pub len: usize,
}

/// Owns the data source and the single expanded-group window.
///
/// The flat sequence is every group row in order, with the expanded group's
/// children spliced in right after it. The cached child count is what was
/// last announced to the host, so all index math uses the cache rather than
/// asking the source again.
pub struct GroupAdapter<S: ExpandableSource> {
    source: S,
    expanded: Option<usize>,
    expanded_child_count: usize,
    stable_id_mode: StableIdMode,
    expanded_stable_id: Option<StableId<S::StableId>>,
}

impl<S: ExpandableSource> GroupAdapter<S> {
    pub(crate) fn new(source: S) -> Self {
        Self {
            source,
            expanded: None,
            expanded_child_count: 0,
            stable_id_mode: StableIdMode::None,
            expanded_stable_id: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub(crate) fn into_source(self) -> S {
        self.source
    }

    #[must_use]
    pub const fn expanded_position(&self) -> Option<usize> {
        self.expanded
    }

    #[must_use]
    pub const fn expanded_child_count(&self) -> usize {
        self.expanded_child_count
    }

    #[must_use]
    pub const fn stable_id_mode(&self) -> StableIdMode {
        self.stable_id_mode
    }

    pub(crate) const fn set_stable_id_mode(&mut self, mode: StableIdMode) {
        self.stable_id_mode = mode;
    }

    pub(crate) fn expanded_stable_id(&self) -> Option<&StableId<S::StableId>> {
        self.expanded_stable_id.as_ref()
    }

    pub(crate) fn stash_expanded_stable_id(&mut self, id: Option<StableId<S::StableId>>) {
        self.expanded_stable_id = id;
    }

    /// Payload of the expanded group, if any.
    pub fn expanded_group(&self) -> Option<&S::Item> {
        self.expanded.map(|group| self.source.group(group))
    }

    /// Group row count plus the expanded child window.
    #[must_use]
    pub fn flat_count(&self) -> usize {
        let children = if self.expanded.is_some() {
            self.expanded_child_count
        } else {
            0
        };
        self.source.group_count() + children
    }

    /// The flat to logical mapping. Every other index computation in the
    /// crate goes through here.
    #[must_use]
    pub fn position_of(&self, flat: usize) -> FlatPos {
        match self.expanded {
            Some(expanded) if flat > expanded => {
                if flat <= expanded + self.expanded_child_count {
                    FlatPos::Child {
                        group: expanded,
                        child: flat - expanded - 1,
                    }
                } else {
                    FlatPos::Group(flat - self.expanded_child_count)
                }
            }
            _ => FlatPos::Group(flat),
        }
    }

    /// Flat index of a group row.
    #[must_use]
    pub fn flat_of_group(&self, group: usize) -> usize {
        match self.expanded {
            Some(expanded) if group > expanded => group + self.expanded_child_count,
            _ => group,
        }
    }

    /// View type of the row at `flat`.
    ///
    /// # Panics
    ///
    /// Panics when the source reports a negative view type.
    #[must_use]
    pub fn view_type_at(&self, flat: usize) -> i32 {
        let view_type = match self.position_of(flat) {
            FlatPos::Group(group) => self.source.group_view_type(group),
            FlatPos::Child { group, child } => self.source.child_view_type(group, child),
        };
        assert!(
            view_type >= 0,
            "invalid view type {view_type} at flat index {flat} (expanded={:?}, children={})",
            self.expanded,
            self.expanded_child_count
        );
        view_type
    }

    /// Stable id of the row at `flat`. Child rows have no identity of their
    /// own and always yield `None`.
    #[must_use]
    pub fn stable_id_at(&self, flat: usize) -> Option<StableId<S::StableId>> {
        match self.position_of(flat) {
            FlatPos::Group(group) => self.stable_id_of(group),
            FlatPos::Child { .. } => None,
        }
    }

    pub(crate) fn stable_id_of(&self, group: usize) -> Option<StableId<S::StableId>> {
        match self.stable_id_mode {
            StableIdMode::None => None,
            StableIdMode::Integral => self.source.group_integral_id(group).map(StableId::Integral),
            StableIdMode::Opaque => self.source.group_stable_id(group).map(StableId::Opaque),
        }
    }

    /// Binds the holder to the row at `flat`, mirroring the expanded and
    /// selected flags onto it.
    ///
    /// The expanded flag is forced through the holder notification so a
    /// recycled holder always repaints its disclosure state.
    pub fn bind_holder(
        &self,
        holder: &mut S::Holder,
        flat: usize,
        selected_group: Option<usize>,
    ) -> Result<(), BindMismatch> {
        let expected = self.view_type_at(flat);
        let actual = holder.state().view_type();
        if actual != expected {
            return Err(BindMismatch {
                expected,
                actual,
                flat,
            });
        }
        match self.position_of(flat) {
            FlatPos::Group(group) => {
                holder.state_mut().selected = selected_group == Some(group);
                self.source.bind_group(holder, group);
                holder::set_expanded_flag(holder, self.expanded == Some(group), true);
            }
            FlatPos::Child { group, child } => {
                holder.state_mut().selected = selected_group == Some(group);
                self.source.bind_child(holder, group, child);
            }
        }
        Ok(())
    }

    /// Group position owning the holder at `flat`.
    ///
    /// Non-strict resolution maps child rows back onto the flat index space
    /// used before the expansion, which is what stale animation events carry.
    ///
    /// # Panics
    ///
    /// In strict mode, panics when `flat` addresses a child row.
    #[must_use]
    pub(crate) fn holder_group_position(&self, flat: usize, strict: bool) -> usize {
        match self.position_of(flat) {
            FlatPos::Group(group) => group,
            FlatPos::Child { group: expanded, .. } => {
                assert!(
                    !strict,
                    "flat index {flat} is a child row of group {expanded} and cannot start a transition"
                );
                if flat < expanded + self.expanded_child_count {
                    flat
                } else {
                    flat - self.expanded_child_count
                }
            }
        }
    }

    /// Moves the expanded window, refreshing the cached child count and
    /// stable id. Out-of-range positions reset to `None`. Returns whether
    /// anything changed. No notification is emitted.
    pub(crate) fn set_expanded_position(&mut self, group: Option<usize>) -> bool {
        let group = group.filter(|&g| {
            let valid = g < self.source.group_count();
            if !valid {
                log::debug!(
                    "expanded position {g} is out of range (group count {}), resetting",
                    self.source.group_count()
                );
            }
            valid
        });

        if self.expanded == group {
            return false;
        }
        self.expanded = group;
        if let Some(g) = group {
            self.expanded_child_count = self.source.children_count(g);
            self.expanded_stable_id = self.stable_id_of(g);
        } else {
            self.expanded_child_count = 0;
            self.expanded_stable_id = None;
        }
        true
    }

    /// Flat window to repaint after the group's content changed.
    pub(crate) fn group_changed(&self, group: usize) -> FlatRange {
        match self.expanded {
            Some(expanded) if group == expanded => FlatRange {
                start: group,
                len: self.expanded_child_count + 1,
            },
            Some(expanded) if group > expanded => FlatRange {
                start: group + self.expanded_child_count,
                len: 1,
            },
            _ => FlatRange {
                start: group,
                len: 1,
            },
        }
    }

    /// Accounts for a group inserted at `group` and returns the flat window
    /// to announce as inserted.
    ///
    /// An insertion at the expanded position displaces the expanded content
    /// downward, so the whole former window is announced.
    pub(crate) fn group_inserted(&mut self, group: usize) -> FlatRange {
        let range = match self.expanded {
            Some(expanded) if group < expanded => {
                self.set_expanded_position(Some(expanded + 1));
                FlatRange {
                    start: group,
                    len: 1,
                }
            }
            Some(expanded) if group == expanded => {
                let len = self.expanded_child_count + 1;
                self.set_expanded_position(Some(expanded + 1));
                FlatRange { start: group, len }
            }
            Some(_) => FlatRange {
                start: group + self.expanded_child_count,
                len: 1,
            },
            None => FlatRange {
                start: group,
                len: 1,
            },
        };
        log::debug!("group {group} inserted, announcing {range:?}");
        range
    }

    /// Accounts for the group removed at `group` and returns the flat window
    /// to announce as removed. Removing the expanded group takes its child
    /// window with it.
    pub(crate) fn group_removed(&mut self, group: usize) -> FlatRange {
        let range = match self.expanded {
            Some(expanded) if group == expanded => {
                let len = self.expanded_child_count + 1;
                self.expanded = None;
                self.expanded_child_count = 0;
                self.expanded_stable_id = None;
                FlatRange { start: group, len }
            }
            Some(expanded) if group > expanded => FlatRange {
                start: group + self.expanded_child_count,
                len: 1,
            },
            Some(expanded) => {
                self.set_expanded_position(Some(expanded - 1));
                FlatRange {
                    start: group,
                    len: 1,
                }
            }
            None => FlatRange {
                start: group,
                len: 1,
            },
        };
        log::debug!("group {group} removed, announcing {range:?}");
        range
    }

    /// Re-establishes the expanded window after a full reload.
    ///
    /// Opaque ids are resolved back to a position through the source; legacy
    /// integral ids keep the position as-is. Either way the cached child
    /// count is recomputed against the fresh data.
    pub(crate) fn recover_after_reload(&mut self) {
        if self.stable_id_mode == StableIdMode::Opaque
            && let Some(StableId::Opaque(sid)) = self.expanded_stable_id.take()
        {
            let position = self.source.position_of_stable_id(&sid);
            log::debug!("recovered expanded position {position:?} from stable id");
            self.expanded = None;
            self.expanded_child_count = 0;
            self.set_expanded_position(position);
            return;
        }
        self.revalidate_expanded();
    }

    /// Clamps the expanded position against the new group count and refreshes
    /// the cached child count, which may have changed underneath us.
    fn revalidate_expanded(&mut self) {
        let expanded = self.expanded;
        if !self.set_expanded_position(expanded)
            && let Some(group) = self.expanded
        {
            self.expanded_child_count = self.source.children_count(group);
        }
    }
}

impl<S: ExpandableSource> FlatAdapter for GroupAdapter<S> {
    fn flat_count(&self) -> usize {
        Self::flat_count(self)
    }

    fn view_type_at(&self, flat: usize) -> i32 {
        Self::view_type_at(self, flat)
    }
}
