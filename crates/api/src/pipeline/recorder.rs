//! Best-effort audit recording.

use helpdesk_core::audit;
use helpdesk_db::models::activity::NewActivityEntry;
use helpdesk_db::store::EntityStore;
use serde_json::json;

use super::MutationPipeline;

impl<S: EntityStore> MutationPipeline<S> {
    /// Append a batch of activity entries, chaining integrity hashes from
    /// the last persisted entry.
    ///
    /// Recording runs after the primary write has committed; a failure here
    /// must not fail the mutation. Each failed append is logged at WARN so
    /// operators can detect audit loss, and the chain continues from the
    /// last entry that did persist.
    pub(crate) async fn record_activity(&self, entries: Vec<NewActivityEntry>) {
        if entries.is_empty() {
            return;
        }

        let mut prev_hash = match self.store().last_activity_hash().await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read audit chain head; starting from seed");
                None
            }
        };

        for mut entry in entries {
            let entry_data = json!({
                "actor_id": entry.actor_id,
                "action_type": &entry.action_type,
                "target_type": &entry.target_type,
                "target_id": entry.target_id,
                "description": &entry.description,
                "old_value": &entry.old_value,
                "new_value": &entry.new_value,
            })
            .to_string();
            let hash = audit::compute_integrity_hash(prev_hash.as_deref(), &entry_data);
            entry.integrity_hash = Some(hash.clone());

            match self.store().append_activity(&entry).await {
                Ok(_) => prev_hash = Some(hash),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        action_type = %entry.action_type,
                        target_type = %entry.target_type,
                        target_id = entry.target_id,
                        "Failed to record activity entry; audit trail is incomplete"
                    );
                }
            }
        }
    }
}
