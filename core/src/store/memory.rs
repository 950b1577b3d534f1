/// In-memory project store
///
/// DashMap-backed reference implementation. Indexes are maintained on
/// write; deletes cascade to dependent records.
use super::models::*;
use super::{ProjectStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Set when the backing plugin is deactivated; `available()` then
    /// reports false and ability groups skip registration.
    disabled: bool,
    boards: DashMap<Uuid, Board>,
    stages: DashMap<Uuid, Stage>,
    tasks: DashMap<Uuid, Task>,
    comments: DashMap<Uuid, Comment>,
    labels: DashMap<Uuid, Label>,
    attachments: DashMap<Uuid, Attachment>,
    users: DashMap<Uuid, User>,
    members: DashMap<(Uuid, Uuid), MemberRole>, // (board_id, user_id) -> role
    task_label_index: DashMap<Uuid, HashSet<Uuid>>, // task_id -> label ids
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose backing plugin is absent: every group guarding on
    /// `available()` registers nothing.
    pub fn unavailable() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    fn board_or_not_found(&self, id: Uuid) -> StoreResult<Board> {
        self.boards
            .get(&id)
            .map(|b| b.clone())
            .ok_or_else(|| StoreError::NotFound(format!("board {}", id)))
    }

    fn stage_or_not_found(&self, id: Uuid) -> StoreResult<Stage> {
        self.stages
            .get(&id)
            .map(|s| s.clone())
            .ok_or_else(|| StoreError::NotFound(format!("stage {}", id)))
    }

    fn task_or_not_found(&self, id: Uuid) -> StoreResult<Task> {
        self.tasks
            .get(&id)
            .map(|t| t.clone())
            .ok_or_else(|| StoreError::NotFound(format!("task {}", id)))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    fn available(&self) -> bool {
        !self.disabled
    }

    async fn create_board(&self, title: String, description: String) -> StoreResult<Board> {
        let now = Utc::now();
        let board = Board {
            id: Uuid::new_v4(),
            title,
            description,
            archived: false,
            created_at: now,
            updated_at: now,
        };
        self.boards.insert(board.id, board.clone());
        Ok(board)
    }

    async fn board(&self, id: Uuid) -> StoreResult<Board> {
        self.board_or_not_found(id)
    }

    async fn boards(&self) -> StoreResult<Vec<Board>> {
        let mut all: Vec<Board> = self.boards.iter().map(|b| b.clone()).collect();
        all.sort_by_key(|b| b.created_at);
        Ok(all)
    }

    async fn update_board(&self, id: Uuid, patch: BoardPatch) -> StoreResult<Board> {
        let mut entry = self
            .boards
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("board {}", id)))?;
        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(description) = patch.description {
            entry.description = description;
        }
        if let Some(archived) = patch.archived {
            entry.archived = archived;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_board(&self, id: Uuid) -> StoreResult<()> {
        self.boards
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("board {}", id)))?;
        let stage_ids: Vec<Uuid> = self
            .stages
            .iter()
            .filter(|s| s.board_id == id)
            .map(|s| s.id)
            .collect();
        for sid in stage_ids {
            self.stages.remove(&sid);
        }
        let task_ids: Vec<Uuid> = self
            .tasks
            .iter()
            .filter(|t| t.board_id == id)
            .map(|t| t.id)
            .collect();
        for tid in task_ids {
            self.tasks.remove(&tid);
            self.task_label_index.remove(&tid);
            self.comments.retain(|_, c| c.task_id != tid);
            self.attachments.retain(|_, a| a.task_id != tid);
        }
        self.labels.retain(|_, l| l.board_id != id);
        self.members.retain(|(bid, _), _| *bid != id);
        Ok(())
    }

    async fn create_stage(&self, board_id: Uuid, title: String) -> StoreResult<Stage> {
        self.board_or_not_found(board_id)?;
        let position = self
            .stages
            .iter()
            .filter(|s| s.board_id == board_id)
            .count() as u32;
        let stage = Stage {
            id: Uuid::new_v4(),
            board_id,
            title,
            position,
        };
        self.stages.insert(stage.id, stage.clone());
        Ok(stage)
    }

    async fn stages(&self, board_id: Uuid) -> StoreResult<Vec<Stage>> {
        self.board_or_not_found(board_id)?;
        let mut list: Vec<Stage> = self
            .stages
            .iter()
            .filter(|s| s.board_id == board_id)
            .map(|s| s.clone())
            .collect();
        list.sort_by_key(|s| s.position);
        Ok(list)
    }

    async fn reorder_stages(&self, board_id: Uuid, order: Vec<Uuid>) -> StoreResult<Vec<Stage>> {
        self.board_or_not_found(board_id)?;
        for (pos, sid) in order.iter().enumerate() {
            let mut stage = self
                .stages
                .get_mut(sid)
                .ok_or_else(|| StoreError::NotFound(format!("stage {}", sid)))?;
            if stage.board_id != board_id {
                return Err(StoreError::Conflict(format!(
                    "stage {} does not belong to board {}",
                    sid, board_id
                )));
            }
            stage.position = pos as u32;
        }
        self.stages(board_id).await
    }

    async fn delete_stage(&self, id: Uuid) -> StoreResult<()> {
        let stage = self.stage_or_not_found(id)?;
        let open: usize = self.tasks.iter().filter(|t| t.stage_id == id).count();
        if open > 0 {
            return Err(StoreError::Conflict(format!(
                "stage {} still holds {} tasks",
                stage.id, open
            )));
        }
        self.stages.remove(&id);
        Ok(())
    }

    async fn create_task(
        &self,
        board_id: Uuid,
        stage_id: Uuid,
        title: String,
        description: String,
    ) -> StoreResult<Task> {
        self.board_or_not_found(board_id)?;
        let stage = self.stage_or_not_found(stage_id)?;
        if stage.board_id != board_id {
            return Err(StoreError::Conflict(format!(
                "stage {} does not belong to board {}",
                stage_id, board_id
            )));
        }
        let position = self
            .tasks
            .iter()
            .filter(|t| t.stage_id == stage_id)
            .count() as u32;
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            board_id,
            stage_id,
            title,
            description,
            assignee: None,
            due_at: None,
            done: false,
            position,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn task(&self, id: Uuid) -> StoreResult<Task> {
        self.task_or_not_found(id)
    }

    async fn tasks(&self, board_id: Uuid) -> StoreResult<Vec<Task>> {
        self.board_or_not_found(board_id)?;
        let mut list: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.board_id == board_id)
            .map(|t| t.clone())
            .collect();
        list.sort_by_key(|t| (t.stage_id, t.position));
        Ok(list)
    }

    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Task> {
        let mut entry = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("task {}", id)))?;
        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(description) = patch.description {
            entry.description = description;
        }
        if let Some(assignee) = patch.assignee {
            entry.assignee = Some(assignee);
        }
        if let Some(due_at) = patch.due_at {
            entry.due_at = Some(due_at);
        }
        if let Some(done) = patch.done {
            entry.done = done;
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn move_task(&self, id: Uuid, stage_id: Uuid, position: u32) -> StoreResult<Task> {
        let stage = self.stage_or_not_found(stage_id)?;
        let mut entry = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("task {}", id)))?;
        if stage.board_id != entry.board_id {
            return Err(StoreError::Conflict(format!(
                "stage {} belongs to a different board",
                stage_id
            )));
        }
        entry.stage_id = stage_id;
        entry.position = position;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        self.tasks
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("task {}", id)))?;
        self.comments.retain(|_, c| c.task_id != id);
        self.attachments.retain(|_, a| a.task_id != id);
        self.task_label_index.remove(&id);
        Ok(())
    }

    async fn add_comment(
        &self,
        task_id: Uuid,
        author_id: Uuid,
        body: String,
    ) -> StoreResult<Comment> {
        self.task_or_not_found(task_id)?;
        let comment = Comment {
            id: Uuid::new_v4(),
            task_id,
            author_id,
            body,
            created_at: Utc::now(),
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn comments(&self, task_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.task_or_not_found(task_id)?;
        let mut list: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .map(|c| c.clone())
            .collect();
        list.sort_by_key(|c| c.created_at);
        Ok(list)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<()> {
        self.comments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("comment {}", id)))
    }

    async fn create_label(
        &self,
        board_id: Uuid,
        name: String,
        color: String,
    ) -> StoreResult<Label> {
        self.board_or_not_found(board_id)?;
        let duplicate = self
            .labels
            .iter()
            .any(|l| l.board_id == board_id && l.name == name);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "label '{}' already exists on board {}",
                name, board_id
            )));
        }
        let label = Label {
            id: Uuid::new_v4(),
            board_id,
            name,
            color,
        };
        self.labels.insert(label.id, label.clone());
        Ok(label)
    }

    async fn labels(&self, board_id: Uuid) -> StoreResult<Vec<Label>> {
        self.board_or_not_found(board_id)?;
        let mut list: Vec<Label> = self
            .labels
            .iter()
            .filter(|l| l.board_id == board_id)
            .map(|l| l.clone())
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn assign_label(&self, task_id: Uuid, label_id: Uuid) -> StoreResult<()> {
        self.task_or_not_found(task_id)?;
        if !self.labels.contains_key(&label_id) {
            return Err(StoreError::NotFound(format!("label {}", label_id)));
        }
        self.task_label_index
            .entry(task_id)
            .or_default()
            .insert(label_id);
        Ok(())
    }

    async fn unassign_label(&self, task_id: Uuid, label_id: Uuid) -> StoreResult<()> {
        if let Some(mut set) = self.task_label_index.get_mut(&task_id) {
            set.remove(&label_id);
        }
        Ok(())
    }

    async fn task_labels(&self, task_id: Uuid) -> StoreResult<Vec<Label>> {
        self.task_or_not_found(task_id)?;
        let ids = self
            .task_label_index
            .get(&task_id)
            .map(|s| s.clone())
            .unwrap_or_default();
        let mut list: Vec<Label> = ids
            .iter()
            .filter_map(|id| self.labels.get(id).map(|l| l.clone()))
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn add_attachment(
        &self,
        task_id: Uuid,
        file_name: String,
        url: String,
    ) -> StoreResult<Attachment> {
        self.task_or_not_found(task_id)?;
        let attachment = Attachment {
            id: Uuid::new_v4(),
            task_id,
            file_name,
            url,
            created_at: Utc::now(),
        };
        self.attachments.insert(attachment.id, attachment.clone());
        Ok(attachment)
    }

    async fn attachments(&self, task_id: Uuid) -> StoreResult<Vec<Attachment>> {
        self.task_or_not_found(task_id)?;
        let mut list: Vec<Attachment> = self
            .attachments
            .iter()
            .filter(|a| a.task_id == task_id)
            .map(|a| a.clone())
            .collect();
        list.sort_by_key(|a| a.created_at);
        Ok(list)
    }

    async fn delete_attachment(&self, id: Uuid) -> StoreResult<()> {
        self.attachments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("attachment {}", id)))
    }

    async fn create_user(&self, display_name: String, email: String) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            display_name,
            email,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user(&self, id: Uuid) -> StoreResult<User> {
        self.users
            .get(&id)
            .map(|u| u.clone())
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))
    }

    async fn users(&self) -> StoreResult<Vec<User>> {
        let mut all: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        all.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(all)
    }

    async fn add_member(&self, board_id: Uuid, user_id: Uuid, role: MemberRole) -> StoreResult<()> {
        self.board_or_not_found(board_id)?;
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        self.members.insert((board_id, user_id), role);
        Ok(())
    }

    async fn board_members(&self, board_id: Uuid) -> StoreResult<Vec<BoardMember>> {
        self.board_or_not_found(board_id)?;
        Ok(self
            .members
            .iter()
            .filter(|e| e.key().0 == board_id)
            .map(|e| BoardMember {
                board_id: e.key().0,
                user_id: e.key().1,
                role: *e.value(),
            })
            .collect())
    }

    async fn board_role(&self, board_id: Uuid, user_id: Uuid) -> StoreResult<Option<MemberRole>> {
        Ok(self.members.get(&(board_id, user_id)).map(|r| *r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn board_crud_round_trip() {
        let store = MemoryStore::new();
        let board = store
            .create_board("Roadmap".into(), "Q3 planning".into())
            .await
            .unwrap();

        let fetched = store.board(board.id).await.unwrap();
        assert_eq!(fetched.title, "Roadmap");

        let updated = store
            .update_board(
                board.id,
                BoardPatch {
                    archived: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.archived);

        store.delete_board(board.id).await.unwrap();
        assert!(store.board(board.id).await.is_err());
    }

    #[tokio::test]
    async fn delete_board_cascades() {
        let store = MemoryStore::new();
        let board = store.create_board("B".into(), String::new()).await.unwrap();
        let stage = store.create_stage(board.id, "Todo".into()).await.unwrap();
        let task = store
            .create_task(board.id, stage.id, "T".into(), String::new())
            .await
            .unwrap();

        store.delete_board(board.id).await.unwrap();
        assert!(store.task(task.id).await.is_err());
        assert!(store.stages(board.id).await.is_err());
    }

    #[tokio::test]
    async fn stage_delete_refuses_when_tasks_remain() {
        let store = MemoryStore::new();
        let board = store.create_board("B".into(), String::new()).await.unwrap();
        let stage = store.create_stage(board.id, "Doing".into()).await.unwrap();
        store
            .create_task(board.id, stage.id, "T".into(), String::new())
            .await
            .unwrap();

        let err = store.delete_stage(stage.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn membership_lookup() {
        let store = MemoryStore::new();
        let board = store.create_board("B".into(), String::new()).await.unwrap();
        let user = store
            .create_user("Ada".into(), "ada@example.com".into())
            .await
            .unwrap();

        assert_eq!(store.board_role(board.id, user.id).await.unwrap(), None);
        store
            .add_member(board.id, user.id, MemberRole::Manager)
            .await
            .unwrap();
        assert_eq!(
            store.board_role(board.id, user.id).await.unwrap(),
            Some(MemberRole::Manager)
        );
    }
}
