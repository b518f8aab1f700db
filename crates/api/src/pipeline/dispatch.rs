//! Best-effort notification fan-out.

use helpdesk_core::types::DbId;
use helpdesk_db::models::notification::NewNotification;
use helpdesk_db::store::EntityStore;

use super::MutationPipeline;

impl<S: EntityStore> MutationPipeline<S> {
    /// Write one notification row per recipient.
    ///
    /// Recipient writes are independent: a failure for one recipient is
    /// logged and skipped, and neither blocks the remaining recipients nor
    /// fails the mutation that triggered the dispatch.
    pub(crate) async fn dispatch_notifications(
        &self,
        recipients: &[DbId],
        message: &str,
        kind: &str,
        related_type: &str,
        related_id: DbId,
    ) {
        for &user_id in recipients {
            let notification = NewNotification {
                user_id,
                message: message.to_string(),
                kind: kind.to_string(),
                related_id: Some(related_id),
                related_type: Some(related_type.to_string()),
            };
            if let Err(e) = self.store().insert_notification(&notification).await {
                tracing::warn!(
                    error = %e,
                    user_id,
                    kind,
                    "Failed to write notification; skipping recipient"
                );
            }
        }
    }
}
