/// Comment abilities
use crate::abilities::group::{require_str, require_uuid, AbilityGroup};
use crate::abilities::{native_handler, Ability, AbilityRegistry, AbilityResponse, Permission};
use crate::store::ProjectStore;
use serde_json::json;
use std::sync::Arc;

pub struct CommentAbilities {
    store: Arc<dyn ProjectStore>,
}

impl CommentAbilities {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }
}

impl AbilityGroup for CommentAbilities {
    fn slug(&self) -> &'static str {
        "comments"
    }

    fn enabled(&self) -> bool {
        self.store.available()
    }

    fn register(&self, registry: &AbilityRegistry) -> usize {
        let mut count = 0;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "comments/add",
            "Add a comment to a task",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" },
                    "author_id": { "type": "string" },
                    "body": { "type": "string" }
                },
                "required": ["task_id", "author_id", "body"]
            }),
            Permission::manage(),
            "comment_add_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let author_id = require_uuid(&args, "author_id")?;
                    let body = require_str(&args, "body")?.to_string();
                    let comment = store.add_comment(task_id, author_id, body).await?;
                    Ok(
                        AbilityResponse::success_with_message(json!(comment), "Comment added")
                            .into_value(),
                    )
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "comments/list",
            "List the comments on a task, oldest first",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" }
                },
                "required": ["task_id"]
            }),
            Permission::view(),
            "comment_list_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let comments = store.comments(task_id).await?;
                    Ok(AbilityResponse::success(json!({
                        "comments": comments,
                        "count": comments.len()
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "comments/delete",
            "Delete a comment",
            json!({
                "type": "object",
                "properties": {
                    "comment_id": { "type": "string" }
                },
                "required": ["comment_id"]
            }),
            Permission::manage(),
            "comment_delete_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let comment_id = require_uuid(&args, "comment_id")?;
                    store.delete_comment(comment_id).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "comment_id": comment_id }),
                        "Comment deleted",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        count
    }
}
