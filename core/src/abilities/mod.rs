/// Ability model: descriptors, registry, permissions, response envelope
///
/// Architecture:
/// - `ability`: descriptor + tagged execution kind (native vs remote proxy)
/// - `registry`: process-wide directory with permission gate and dispatch
/// - `policy`: view/manage access predicates with resource refinement
/// - `group`: contract for cohesive sets of native abilities
/// - `response`: the uniform success/error envelope
pub mod ability;
pub mod error;
pub mod group;
pub mod policy;
pub mod registry;
pub mod response;

pub use ability::{
    allow_all_bridges, native_handler, Ability, AbilityKind, BridgePolicy, Permission,
};
pub use error::{AbilityError, AbilityResult};
pub use group::{register_groups, AbilityGroup};
pub use policy::{AccessPolicy, MembershipPolicy, Role, RolePolicy};
pub use registry::AbilityRegistry;
pub use response::{AbilityFault, AbilityResponse};
