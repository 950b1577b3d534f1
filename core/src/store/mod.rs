/// Project store boundary
///
/// Abilities never touch persistence directly; everything goes through
/// the `ProjectStore` trait. `MemoryStore` is the reference
/// implementation used by the demo and tests.
pub mod memory;
pub mod models;

pub use memory::MemoryStore;
pub use models::{
    Attachment, Board, BoardMember, BoardPatch, Comment, Label, MemberRole, Stage, Task, TaskPatch,
    User,
};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The wrapped project-management backend.
///
/// Write operations return the stored record so callers can echo it
/// back without a second read.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Whether the backing plugin/storage is present and usable.
    /// Ability groups register nothing when this is false.
    fn available(&self) -> bool {
        true
    }

    // Boards
    async fn create_board(&self, title: String, description: String) -> StoreResult<Board>;
    async fn board(&self, id: Uuid) -> StoreResult<Board>;
    async fn boards(&self) -> StoreResult<Vec<Board>>;
    async fn update_board(&self, id: Uuid, patch: BoardPatch) -> StoreResult<Board>;
    async fn delete_board(&self, id: Uuid) -> StoreResult<()>;

    // Stages
    async fn create_stage(&self, board_id: Uuid, title: String) -> StoreResult<Stage>;
    async fn stages(&self, board_id: Uuid) -> StoreResult<Vec<Stage>>;
    async fn reorder_stages(&self, board_id: Uuid, order: Vec<Uuid>) -> StoreResult<Vec<Stage>>;
    async fn delete_stage(&self, id: Uuid) -> StoreResult<()>;

    // Tasks
    async fn create_task(
        &self,
        board_id: Uuid,
        stage_id: Uuid,
        title: String,
        description: String,
    ) -> StoreResult<Task>;
    async fn task(&self, id: Uuid) -> StoreResult<Task>;
    async fn tasks(&self, board_id: Uuid) -> StoreResult<Vec<Task>>;
    async fn update_task(&self, id: Uuid, patch: TaskPatch) -> StoreResult<Task>;
    async fn move_task(&self, id: Uuid, stage_id: Uuid, position: u32) -> StoreResult<Task>;
    async fn delete_task(&self, id: Uuid) -> StoreResult<()>;

    // Comments
    async fn add_comment(&self, task_id: Uuid, author_id: Uuid, body: String)
        -> StoreResult<Comment>;
    async fn comments(&self, task_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> StoreResult<()>;

    // Labels
    async fn create_label(&self, board_id: Uuid, name: String, color: String)
        -> StoreResult<Label>;
    async fn labels(&self, board_id: Uuid) -> StoreResult<Vec<Label>>;
    async fn assign_label(&self, task_id: Uuid, label_id: Uuid) -> StoreResult<()>;
    async fn unassign_label(&self, task_id: Uuid, label_id: Uuid) -> StoreResult<()>;
    async fn task_labels(&self, task_id: Uuid) -> StoreResult<Vec<Label>>;

    // Attachments
    async fn add_attachment(
        &self,
        task_id: Uuid,
        file_name: String,
        url: String,
    ) -> StoreResult<Attachment>;
    async fn attachments(&self, task_id: Uuid) -> StoreResult<Vec<Attachment>>;
    async fn delete_attachment(&self, id: Uuid) -> StoreResult<()>;

    // Users and membership
    async fn create_user(&self, display_name: String, email: String) -> StoreResult<User>;
    async fn user(&self, id: Uuid) -> StoreResult<User>;
    async fn users(&self) -> StoreResult<Vec<User>>;
    async fn add_member(&self, board_id: Uuid, user_id: Uuid, role: MemberRole) -> StoreResult<()>;
    async fn board_members(&self, board_id: Uuid) -> StoreResult<Vec<BoardMember>>;
    async fn board_role(&self, board_id: Uuid, user_id: Uuid) -> StoreResult<Option<MemberRole>>;
}
