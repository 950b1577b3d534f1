/// Attachment abilities
use crate::abilities::group::{require_str, require_uuid, AbilityGroup};
use crate::abilities::{native_handler, Ability, AbilityRegistry, AbilityResponse, Permission};
use crate::store::ProjectStore;
use serde_json::json;
use std::sync::Arc;

pub struct AttachmentAbilities {
    store: Arc<dyn ProjectStore>,
}

impl AttachmentAbilities {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }
}

impl AbilityGroup for AttachmentAbilities {
    fn slug(&self) -> &'static str {
        "attachments"
    }

    fn enabled(&self) -> bool {
        self.store.available()
    }

    fn register(&self, registry: &AbilityRegistry) -> usize {
        let mut count = 0;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "attachments/add",
            "Attach a file reference to a task",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" },
                    "file_name": { "type": "string" },
                    "url": { "type": "string" }
                },
                "required": ["task_id", "file_name", "url"]
            }),
            Permission::manage(),
            "attachment_add_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let file_name = require_str(&args, "file_name")?.to_string();
                    let url = require_str(&args, "url")?.to_string();
                    let attachment = store.add_attachment(task_id, file_name, url).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!(attachment),
                        "Attachment added",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "attachments/list",
            "List the attachments on a task",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" }
                },
                "required": ["task_id"]
            }),
            Permission::view(),
            "attachment_list_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let attachments = store.attachments(task_id).await?;
                    Ok(AbilityResponse::success(json!({
                        "attachments": attachments,
                        "count": attachments.len()
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "attachments/delete",
            "Delete an attachment",
            json!({
                "type": "object",
                "properties": {
                    "attachment_id": { "type": "string" }
                },
                "required": ["attachment_id"]
            }),
            Permission::manage(),
            "attachment_delete_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let attachment_id = require_uuid(&args, "attachment_id")?;
                    store.delete_attachment(attachment_id).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "attachment_id": attachment_id }),
                        "Attachment deleted",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        count
    }
}
