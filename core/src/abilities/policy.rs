/// Access policies for native abilities
///
/// Two predicate strengths: `can_view` grants read access, `can_manage`
/// grants read+write. When the embedding environment can resolve a
/// resource id, the policy may refine the answer per resource; without
/// one it falls back to a coarse role check.
use crate::store::{MemberRole, ProjectStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Coarse role of the acting identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Member,
    Manager,
}

#[async_trait]
pub trait AccessPolicy: Send + Sync {
    async fn can_view(&self, resource: Option<&str>) -> bool;
    async fn can_manage(&self, resource: Option<&str>) -> bool;
}

/// Role-only policy; ignores the resource refinement.
pub struct RolePolicy {
    role: Role,
}

impl RolePolicy {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn manager() -> Self {
        Self::new(Role::Manager)
    }
}

#[async_trait]
impl AccessPolicy for RolePolicy {
    async fn can_view(&self, _resource: Option<&str>) -> bool {
        self.role >= Role::Member
    }

    async fn can_manage(&self, _resource: Option<&str>) -> bool {
        self.role >= Role::Manager
    }
}

/// Store-backed policy: consults per-board membership when the resource
/// id names a board the acting user belongs to, otherwise answers with
/// the coarse fallback role.
pub struct MembershipPolicy {
    store: Arc<dyn ProjectStore>,
    user_id: Uuid,
    fallback: Role,
}

impl MembershipPolicy {
    pub fn new(store: Arc<dyn ProjectStore>, user_id: Uuid, fallback: Role) -> Self {
        Self {
            store,
            user_id,
            fallback,
        }
    }

    async fn membership(&self, resource: Option<&str>) -> Option<MemberRole> {
        let board_id = Uuid::parse_str(resource?).ok()?;
        match self.store.board_role(board_id, self.user_id).await {
            Ok(role) => role,
            Err(e) => {
                debug!(target: "access_policy", error = %e, "Membership lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl AccessPolicy for MembershipPolicy {
    async fn can_view(&self, resource: Option<&str>) -> bool {
        match self.membership(resource).await {
            Some(_) => true,
            None => self.fallback >= Role::Member,
        }
    }

    async fn can_manage(&self, resource: Option<&str>) -> bool {
        match self.membership(resource).await {
            Some(role) => role >= MemberRole::Manager,
            None => self.fallback >= Role::Manager,
        }
    }
}
