use shareit_core::UserId;

/// Identity of the caller, taken from the `X-Sharer-User-Id` header.
///
/// The header is trusted as-is; authentication happens upstream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
}

impl CallerContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
