// src/auth/policy.rs
use serde::Serialize;

use crate::domain::status::sql_text_enum;
use crate::domain::target::Target;

sql_text_enum! {
    pub enum Role("role") {
        User => "user",
        Moderator => "moderator",
        Staff => "staff",
    }
}

/// The user performing an action, as resolved from the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn is_trusted(&self) -> bool {
        matches!(self.role, Role::Moderator | Role::Staff)
    }
}

/// Authorization hook for trust-sensitive operations.
pub trait TrustPolicy {
    fn can_verify(&self, actor: &Actor, target: Target) -> bool;
    fn can_moderate(&self, actor: &Actor) -> bool;

    /// Status changes and edits are open to any signed-in user by default.
    fn can_change_status(&self, _actor: &Actor, _target: Target) -> bool {
        true
    }
}

/// Moderators and staff may verify and moderate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl TrustPolicy for RolePolicy {
    fn can_verify(&self, actor: &Actor, _target: Target) -> bool {
        actor.is_trusted()
    }

    fn can_moderate(&self, actor: &Actor) -> bool {
        actor.is_trusted()
    }
}
