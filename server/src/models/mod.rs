use serde::{Deserialize, Deserializer};

pub mod comment;
pub mod event;
pub mod role;
pub mod signup;
pub mod slot;

pub use comment::{Comment, CommentPatch, NewComment};
pub use event::{Event, EventPatch, NewEvent};
pub use role::{IdentityUser, Role, RoleAssignment, RoleCheck};
pub use signup::{Claim, NewSignup, Signup, SignupPatch};
pub use slot::{NewSlot, Slot, SlotPatch, SlotUpdate};

/// Reads a clearable patch field: absent is `None`, `null` is `Some(None)`.
/// Use together with `#[serde(default)]`.
pub(crate) fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
