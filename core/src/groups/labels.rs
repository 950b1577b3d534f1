/// Label abilities
use crate::abilities::group::{opt_str, require_str, require_uuid, AbilityGroup};
use crate::abilities::{native_handler, Ability, AbilityRegistry, AbilityResponse, Permission};
use crate::store::ProjectStore;
use serde_json::json;
use std::sync::Arc;

pub struct LabelAbilities {
    store: Arc<dyn ProjectStore>,
}

impl LabelAbilities {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }
}

impl AbilityGroup for LabelAbilities {
    fn slug(&self) -> &'static str {
        "labels"
    }

    fn enabled(&self) -> bool {
        self.store.available()
    }

    fn register(&self, registry: &AbilityRegistry) -> usize {
        let mut count = 0;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "labels/create",
            "Create a label on a board",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" },
                    "name": { "type": "string" },
                    "color": { "type": "string" }
                },
                "required": ["board_id", "name"]
            }),
            Permission::manage_on("board_id"),
            "label_create_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let name = require_str(&args, "name")?.to_string();
                    let color = opt_str(&args, "color").unwrap_or_else(|| "#808080".to_string());
                    let label = store.create_label(board_id, name, color).await?;
                    Ok(
                        AbilityResponse::success_with_message(json!(label), "Label created")
                            .into_value(),
                    )
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "labels/list",
            "List the labels of a board",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" }
                },
                "required": ["board_id"]
            }),
            Permission::view_on("board_id"),
            "label_list_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let labels = store.labels(board_id).await?;
                    Ok(AbilityResponse::success(json!({
                        "labels": labels,
                        "count": labels.len()
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "labels/assign",
            "Attach a label to a task",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" },
                    "label_id": { "type": "string" }
                },
                "required": ["task_id", "label_id"]
            }),
            Permission::manage(),
            "label_assign_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let label_id = require_uuid(&args, "label_id")?;
                    store.assign_label(task_id, label_id).await?;
                    let labels = store.task_labels(task_id).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "task_id": task_id, "labels": labels }),
                        "Label assigned",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "labels/unassign",
            "Detach a label from a task",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" },
                    "label_id": { "type": "string" }
                },
                "required": ["task_id", "label_id"]
            }),
            Permission::manage(),
            "label_unassign_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let label_id = require_uuid(&args, "label_id")?;
                    store.unassign_label(task_id, label_id).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "task_id": task_id, "label_id": label_id }),
                        "Label unassigned",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        count
    }
}
