/// Task abilities
use crate::abilities::group::{
    opt_bool, opt_str, opt_u32, opt_uuid, require_str, require_uuid, AbilityGroup,
};
use crate::abilities::{native_handler, Ability, AbilityRegistry, AbilityResponse, Permission};
use crate::abilities::{AbilityError, AbilityResult};
use crate::store::{ProjectStore, TaskPatch};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct TaskAbilities {
    store: Arc<dyn ProjectStore>,
}

impl TaskAbilities {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }
}

fn opt_datetime(args: &Value, key: &str) -> AbilityResult<Option<DateTime<Utc>>> {
    match args.get(key).and_then(Value::as_str) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|d| Some(d.with_timezone(&Utc)))
            .map_err(|_| {
                AbilityError::InvalidArguments(format!("'{}' is not an RFC 3339 timestamp", key))
            }),
    }
}

impl AbilityGroup for TaskAbilities {
    fn slug(&self) -> &'static str {
        "tasks"
    }

    fn enabled(&self) -> bool {
        self.store.available()
    }

    fn register(&self, registry: &AbilityRegistry) -> usize {
        let mut count = 0;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "tasks/create",
            "Create a task in a stage",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" },
                    "stage_id": { "type": "string" },
                    "title": { "type": "string" },
                    "description": { "type": "string" }
                },
                "required": ["board_id", "stage_id", "title"]
            }),
            Permission::manage_on("board_id"),
            "task_create_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let stage_id = require_uuid(&args, "stage_id")?;
                    let title = require_str(&args, "title")?.to_string();
                    let description = opt_str(&args, "description").unwrap_or_default();
                    let task = store
                        .create_task(board_id, stage_id, title, description)
                        .await?;
                    Ok(
                        AbilityResponse::success_with_message(json!(task), "Task created")
                            .into_value(),
                    )
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "tasks/get",
            "Fetch a single task by id",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" }
                },
                "required": ["task_id"]
            }),
            Permission::view(),
            "task_get_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let task = store.task(task_id).await?;
                    Ok(AbilityResponse::success(json!(task)).into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "tasks/list",
            "List the tasks of a board, grouped by stage position",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" }
                },
                "required": ["board_id"]
            }),
            Permission::view_on("board_id"),
            "task_list_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let tasks = store.tasks(board_id).await?;
                    Ok(AbilityResponse::success(json!({
                        "tasks": tasks,
                        "count": tasks.len()
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "tasks/update",
            "Update task fields (title, description, assignee, due date, done)",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" },
                    "title": { "type": "string" },
                    "description": { "type": "string" },
                    "assignee": { "type": "string" },
                    "due_at": { "type": "string", "format": "date-time" },
                    "done": { "type": "boolean" }
                },
                "required": ["task_id"]
            }),
            Permission::manage(),
            "task_update_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let patch = TaskPatch {
                        title: opt_str(&args, "title"),
                        description: opt_str(&args, "description"),
                        assignee: opt_uuid(&args, "assignee")?,
                        due_at: opt_datetime(&args, "due_at")?,
                        done: opt_bool(&args, "done"),
                    };
                    let task = store.update_task(task_id, patch).await?;
                    Ok(
                        AbilityResponse::success_with_message(json!(task), "Task updated")
                            .into_value(),
                    )
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "tasks/move",
            "Move a task to another stage",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" },
                    "stage_id": { "type": "string" },
                    "position": { "type": "integer", "minimum": 0 }
                },
                "required": ["task_id", "stage_id"]
            }),
            Permission::manage(),
            "task_move_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    let stage_id = require_uuid(&args, "stage_id")?;
                    let position = opt_u32(&args, "position").unwrap_or(0);
                    let task = store.move_task(task_id, stage_id, position).await?;
                    Ok(
                        AbilityResponse::success_with_message(json!(task), "Task moved")
                            .into_value(),
                    )
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "tasks/delete",
            "Delete a task and its comments and attachments",
            json!({
                "type": "object",
                "properties": {
                    "task_id": { "type": "string" }
                },
                "required": ["task_id"]
            }),
            Permission::manage(),
            "task_delete_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let task_id = require_uuid(&args, "task_id")?;
                    store.delete_task(task_id).await?;
                    Ok(AbilityResponse::success_with_message(
                        json!({ "task_id": task_id }),
                        "Task deleted",
                    )
                    .into_value())
                }
            }),
        )) as usize;

        count
    }
}
