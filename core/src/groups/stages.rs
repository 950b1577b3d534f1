/// Stage abilities
use crate::abilities::group::{require_str, require_uuid, AbilityGroup};
use crate::abilities::{native_handler, Ability, AbilityRegistry, AbilityResponse, Permission};
use crate::abilities::{AbilityError, AbilityResult};
use crate::store::ProjectStore;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

pub struct StageAbilities {
    store: Arc<dyn ProjectStore>,
}

impl StageAbilities {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }
}

fn uuid_list(args: &Value, key: &str) -> AbilityResult<Vec<Uuid>> {
    let raw = args
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| AbilityError::InvalidArguments(format!("Missing '{}'", key)))?;
    raw.iter()
        .map(|v| {
            v.as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .ok_or_else(|| {
                    AbilityError::InvalidArguments(format!("'{}' holds an invalid id", key))
                })
        })
        .collect()
}

impl AbilityGroup for StageAbilities {
    fn slug(&self) -> &'static str {
        "stages"
    }

    fn enabled(&self) -> bool {
        self.store.available()
    }

    fn register(&self, registry: &AbilityRegistry) -> usize {
        let mut count = 0;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "stages/create",
            "Add a stage to a board",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" },
                    "title": { "type": "string" }
                },
                "required": ["board_id", "title"]
            }),
            Permission::manage_on("board_id"),
            "stage_create_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let title = require_str(&args, "title")?.to_string();
                    let stage = store.create_stage(board_id, title).await?;
                    Ok(
                        AbilityResponse::success_with_message(json!(stage), "Stage created")
                            .into_value(),
                    )
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "stages/list",
            "List the stages of a board in position order",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" }
                },
                "required": ["board_id"]
            }),
            Permission::view_on("board_id"),
            "stage_list_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let stages = store.stages(board_id).await?;
                    Ok(AbilityResponse::success(json!({
                        "stages": stages,
                        "count": stages.len()
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "stages/reorder",
            "Reorder the stages of a board",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" },
                    "order": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                },
                "required": ["board_id", "order"]
            }),
            Permission::manage_on("board_id"),
            "stage_reorder_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let order = uuid_list(&args, "order")?;
                    let stages = store.reorder_stages(board_id, order).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "stages": stages }),
                        "Stages reordered",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "stages/delete",
            "Delete an empty stage",
            json!({
                "type": "object",
                "properties": {
                    "stage_id": { "type": "string" }
                },
                "required": ["stage_id"]
            }),
            Permission::manage(),
            "stage_delete_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let stage_id = require_uuid(&args, "stage_id")?;
                    store.delete_stage(stage_id).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "stage_id": stage_id }),
                        "Stage deleted",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        count
    }
}
