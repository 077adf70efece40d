use thiserror::Error;

use crate::node::Handle;

/// Reasons a [`Handle`] is not accepted by a list.
///
/// Both variants mean the same thing to the caller: the handle does not name a
/// member of this list, and nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
    /// The handle was issued by a different list, or by this list before it
    /// was re-keyed by a [`ClearPolicy::Reset`](crate::ClearPolicy::Reset) clear.
    #[error("handle {0:?} belongs to another list")]
    ForeignList(Handle),
    /// The element the handle named has been removed or cleared.
    #[error("handle {0:?} refers to an element that is no longer in the list")]
    Detached(Handle),
}

impl HandleError {
    /// The rejected handle.
    pub fn handle(&self) -> Handle {
        match *self {
            HandleError::ForeignList(handle) | HandleError::Detached(handle) => handle,
        }
    }
}
