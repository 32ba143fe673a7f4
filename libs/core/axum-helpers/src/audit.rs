//! Structured audit trail on the `audit` tracing target.
//!
//! ```ignore
//! AuditEvent::new(Some(user.id), "product.delete", Some(format!("product:{}", id)), AuditOutcome::Success)
//!     .with_details(json!({ "images": 3 }))
//!     .log();
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

#[derive(Debug, Serialize)]
pub struct AuditEvent {
    pub user_id: Option<Uuid>,
    /// e.g. "user.login", "product.update"
    pub action: String,
    /// e.g. "product:0190..."
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        user_id: Option<Uuid>,
        action: impl Into<String>,
        resource: Option<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            user_id,
            action: action.into(),
            resource,
            outcome,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub fn log(self) {
        tracing::info!(
            target: "audit",
            user_id = self.user_id.map(|id| id.to_string()),
            action = %self.action,
            resource = self.resource,
            outcome = ?self.outcome,
            "{}",
            serde_json::to_string(&self)
                .unwrap_or_else(|_| "Failed to serialize audit event".to_string())
        );
    }
}
