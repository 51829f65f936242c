use thiserror::Error;

/// A holder was bound at a position whose view type it was not created for.
///
/// The holder keeps its previous content until the next bind, so the failure
/// is recoverable; the widget logs it and moves on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("holder of view type {actual} bound at flat index {flat} where view type {expected} was expected")]
pub struct BindMismatch {
    pub expected: i32,
    pub actual: i32,
    pub flat: usize,
}
