/// Native ability groups
///
/// Each group wraps one slice of the project store behind the ability
/// contract: validate arguments, gate on permission, delegate to the
/// store, format the response envelope. Groups whose backend is absent
/// register nothing.
pub mod attachments;
pub mod boards;
pub mod comments;
pub mod labels;
pub mod reports;
pub mod stages;
pub mod tasks;
pub mod users;

pub use attachments::AttachmentAbilities;
pub use boards::BoardAbilities;
pub use comments::CommentAbilities;
pub use labels::LabelAbilities;
pub use reports::ReportAbilities;
pub use stages::StageAbilities;
pub use tasks::TaskAbilities;
pub use users::UserAbilities;

use crate::abilities::{register_groups, AbilityGroup, AbilityRegistry};
use crate::store::ProjectStore;
use std::sync::Arc;

/// Build every native group against one store and register the enabled
/// ones. Returns the number of abilities registered.
pub fn register_native_groups(registry: &AbilityRegistry, store: Arc<dyn ProjectStore>) -> usize {
    let groups: Vec<Arc<dyn AbilityGroup>> = vec![
        Arc::new(BoardAbilities::new(Arc::clone(&store))),
        Arc::new(StageAbilities::new(Arc::clone(&store))),
        Arc::new(TaskAbilities::new(Arc::clone(&store))),
        Arc::new(CommentAbilities::new(Arc::clone(&store))),
        Arc::new(LabelAbilities::new(Arc::clone(&store))),
        Arc::new(AttachmentAbilities::new(Arc::clone(&store))),
        Arc::new(UserAbilities::new(Arc::clone(&store))),
        Arc::new(ReportAbilities::new(store)),
    ];
    register_groups(registry, &groups)
}
