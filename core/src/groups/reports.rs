/// Reporting abilities
///
/// Read-only aggregations computed from store reads; nothing here
/// mutates state.
use crate::abilities::group::{require_uuid, AbilityGroup};
use crate::abilities::{native_handler, Ability, AbilityRegistry, AbilityResponse, Permission};
use crate::store::ProjectStore;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ReportAbilities {
    store: Arc<dyn ProjectStore>,
}

impl ReportAbilities {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }
}

impl AbilityGroup for ReportAbilities {
    fn slug(&self) -> &'static str {
        "reports"
    }

    fn enabled(&self) -> bool {
        self.store.available()
    }

    fn register(&self, registry: &AbilityRegistry) -> usize {
        let mut count = 0;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "reports/board_summary",
            "Per-stage task counts, completion and overdue totals for a board",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" }
                },
                "required": ["board_id"]
            }),
            Permission::view_on("board_id"),
            "report_board_summary_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let board = store.board(board_id).await?;
                    let stages = store.stages(board_id).await?;
                    let tasks = store.tasks(board_id).await?;

                    let now = Utc::now();
                    let done = tasks.iter().filter(|t| t.done).count();
                    let overdue = tasks
                        .iter()
                        .filter(|t| !t.done && t.due_at.map(|d| d < now).unwrap_or(false))
                        .count();

                    let per_stage: Vec<_> = stages
                        .iter()
                        .map(|stage| {
                            let total = tasks.iter().filter(|t| t.stage_id == stage.id).count();
                            json!({
                                "stage_id": stage.id,
                                "title": stage.title,
                                "tasks": total
                            })
                        })
                        .collect();

                    Ok(AbilityResponse::success(json!({
                        "board_id": board.id,
                        "title": board.title,
                        "total_tasks": tasks.len(),
                        "done": done,
                        "overdue": overdue,
                        "stages": per_stage
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        let store = Arc::clone(&self.store);
        count += registry.register(Ability::native(
            "reports/workload",
            "Open task counts per assignee on a board",
            json!({
                "type": "object",
                "properties": {
                    "board_id": { "type": "string" }
                },
                "required": ["board_id"]
            }),
            Permission::view_on("board_id"),
            "report_workload_failed",
            native_handler(move |args| {
                let store = Arc::clone(&store);
                async move {
                    let board_id = require_uuid(&args, "board_id")?;
                    let tasks = store.tasks(board_id).await?;

                    let mut per_assignee: HashMap<String, usize> = HashMap::new();
                    let mut unassigned = 0;
                    for task in tasks.iter().filter(|t| !t.done) {
                        match task.assignee {
                            Some(user_id) => {
                                *per_assignee.entry(user_id.to_string()).or_insert(0) += 1;
                            }
                            None => unassigned += 1,
                        }
                    }

                    Ok(AbilityResponse::success(json!({
                        "board_id": board_id,
                        "assignees": per_assignee,
                        "unassigned": unassigned
                    }))
                    .into_value())
                }
            }),
        )) as usize;

        count
    }
}
