/// User and membership abilities
use crate::abilities::group::{require_str, require_uuid, AbilityGroup};
use crate::abilities::{native_handler, Ability, AbilityRegistry, AbilityResponse, Permission};
use crate::abilities::AbilityError;
use crate::store::{MemberRole, ProjectStore};
use serde_json::json;
use std::sync::Arc;

pub struct UserAbilities {
    store: Arc<dyn ProjectStore>,
}

impl UserAbilities {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }
}

impl AbilityGroup for UserAbilities {
    fn slug(&self) -> &'static str {
        "users"
    }

    fn enabled(&self) -> bool {
        self.store.available()
    }

    fn register(&self, registry: &AbilityRegistry) -> usize {
        let mut count = 0;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "users/list",
            "List known users",
            json!({ "type": "object", "properties": {} }),
            Permission::view(),
            "user_list_failed",
            native_handler(move |_args| {
                let store = Arc::clone(&store);
                async move {
                    let users = store.users().await?;
                    Ok(AbilityResponse::success(json!({
                        "users": users,
                        "count": users.len()
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "users/get",
            "Fetch a single user by id",
            json!({
                "type": "object",
                "properties": {
                    "user_id": { "type": "string" }
                },
                "required": ["user_id"]
            }),
            Permission::view(),
            "user_get_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let user_id = require_uuid(&args, "user_id")?;
                    let user = store.user(user_id).await?;
                    Ok(AbilityResponse::success(json!(user)).into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "users/add_member",
            "Grant a user a role on a board",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" },
                    "user_id": { "type": "string" },
                    "role": { "type": "string", "enum": ["viewer", "member", "manager"] }
                },
                "required": ["board_id", "user_id", "role"]
            }),
            Permission::manage_on("board_id"),
            "member_add_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let user_id = require_uuid(&args, "user_id")?;
                    let role = match require_str(&args, "role")? {
                        "viewer" => MemberRole::Viewer,
                        "member" => MemberRole::Member,
                        "manager" => MemberRole::Manager,
                        other => {
                            return Err(AbilityError::InvalidArguments(format!(
                                "Unknown role '{}'",
                                other
                            )))
                        }
                    };
                    store.add_member(board_id, user_id, role).await?;
                    let members = store.board_members(board_id).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "board_id": board_id, "members": members }),
                        "Member added",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        count
    }
}
