/// Board abilities
use crate::abilities::group::{opt_bool, opt_str, require_str, require_uuid, AbilityGroup};
use crate::abilities::{native_handler, Ability, AbilityRegistry, AbilityResponse, Permission};
use crate::store::{BoardPatch, ProjectStore};
use serde_json::json;
use std::sync::Arc;

pub struct BoardAbilities {
    store: Arc<dyn ProjectStore>,
}

impl BoardAbilities {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }
}

impl AbilityGroup for BoardAbilities {
    fn slug(&self) -> &'static str {
        "boards"
    }

    fn enabled(&self) -> bool {
        self.store.available()
    }

    fn register(&self, registry: &AbilityRegistry) -> usize {
        let mut count = 0;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "boards/create",
            "Create a new board",
            json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "description": { "type": "string" }
                },
                "required": ["title"]
            }),
            Permission::manage(),
            "board_create_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let title = require_str(&args, "title")?.to_string();
                    let description = opt_str(&args, "description").unwrap_or_default();
                    let board = store.create_board(title, description).await?;
                    Ok(
                        AbilityResponse::success_with_message(json!(board), "Board created")
                            .into_value(),
                    )
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "boards/list",
            "List all boards",
            json!({ "type": "object", "properties": {} }),
            Permission::view(),
            "board_list_failed",
            native_handler(move |_args| {
                let store = Arc::clone(&store);
                async move {
                    let boards = store.boards().await?;
                    Ok(AbilityResponse::success(json!({
                        "boards": boards,
                        "count": boards.len()
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "boards/get",
            "Fetch a single board by id",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" }
                },
                "required": ["board_id"]
            }),
            Permission::view_on("board_id"),
            "board_get_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let board = store.board(board_id).await?;
                    Ok(AbilityResponse::success(json!(board)).into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "boards/update",
            "Update board title, description or archived flag",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" },
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "archived": { "type": "boolean" }
                },
                "required": ["board_id"]
            }),
            Permission::manage_on("board_id"),
            "board_update_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let patch = BoardPatch {
                        title: opt_str(&args, "title"),
                        description: opt_str(&args, "description"),
                        archived: opt_bool(&args, "archived"),
                    };
                    let board = store.update_board(board_id, patch).await?;
                    Ok(
                        AbilityResponse::success_with_message(json!(board), "Board updated")
                            .into_value(),
                    )
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "boards/delete",
            "Delete a board and everything on it",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" }
                },
                "required": ["board_id"]
            }),
            Permission::manage_on("board_id"),
            "board_delete_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    store.delete_board(board_id).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "board_id": board_id }),
                        "Board deleted",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        count
    }
}
