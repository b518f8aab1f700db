//! Audit trail vocabulary and helpers.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the API pipeline and the repository layer. Activity log entries are
//! immutable once written; successive entries form a SHA-256 hash chain so
//! tampering is detectable after the fact.

use serde_json::Value;

use crate::diff::FieldChange;
use crate::hashing;

// ---------------------------------------------------------------------------
// Action type constants
// ---------------------------------------------------------------------------

/// Known action types for activity log entries.
pub mod action_types {
    pub const TICKET_CREATED: &str = "ticket_created";
    pub const TICKET_UPDATED: &str = "ticket_updated";
    pub const TICKET_STATUS_CHANGED: &str = "ticket_status_changed";
    pub const TICKET_PRIORITY_CHANGED: &str = "ticket_priority_changed";
    pub const TICKET_ASSIGNED: &str = "ticket_assigned";
    pub const TICKET_DEPARTMENT_CHANGED: &str = "ticket_department_changed";
    pub const TICKET_CLOSED: &str = "ticket_closed";
    pub const TICKET_REOPENED: &str = "ticket_reopened";
    pub const TICKET_DELETED: &str = "ticket_deleted";
    pub const COMMENT_ADDED: &str = "comment_added";
    pub const COMMENT_DELETED: &str = "comment_deleted";
    pub const DEPARTMENT_CREATED: &str = "department_created";
    pub const DEPARTMENT_UPDATED: &str = "department_updated";
    pub const DEPARTMENT_DELETED: &str = "department_deleted";
    pub const USER_CREATED: &str = "user_created";
    pub const USER_UPDATED: &str = "user_updated";
    pub const USER_DELETED: &str = "user_deleted";
}

/// Known target types for activity log entries.
pub mod target_types {
    pub const TICKET: &str = "ticket";
    pub const USER: &str = "user";
    pub const DEPARTMENT: &str = "department";
}

/// Action type for one ticket field change from the shared diff.
///
/// Derived `closed_at` entries are recorded as a close or a reopen so the
/// ticket history reads naturally; incidental fields (title, description)
/// fall back to the generic update action.
pub fn ticket_field_action(change: &FieldChange) -> &'static str {
    match change.field.as_str() {
        "status" => action_types::TICKET_STATUS_CHANGED,
        "priority" => action_types::TICKET_PRIORITY_CHANGED,
        "agent_id" => action_types::TICKET_ASSIGNED,
        "department_id" => action_types::TICKET_DEPARTMENT_CHANGED,
        "closed_at" => {
            if change.new.is_null() {
                action_types::TICKET_REOPENED
            } else {
                action_types::TICKET_CLOSED
            }
        }
        _ => action_types::TICKET_UPDATED,
    }
}

// ---------------------------------------------------------------------------
// Old/new value serialization
// ---------------------------------------------------------------------------

/// Serialize a diff-side value to the stable text encoding persisted in
/// `old_value`/`new_value` columns.
///
/// Null maps to `None` (SQL NULL), strings are stored bare, every other
/// value as canonical JSON.
pub fn serialize_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Integrity hash computation
// ---------------------------------------------------------------------------

/// Known seed value for the first entry in the hash chain.
const CHAIN_SEED: &str = "ACTIVITY_LOG_CHAIN_SEED_V1";

/// Compute the SHA-256 integrity hash for an activity log entry.
///
/// `prev_hash` is the integrity hash of the previous entry, or `None` for
/// the first entry in the chain (which uses a known seed value).
/// `entry_data` is a canonical string representation of the entry's content.
pub fn compute_integrity_hash(prev_hash: Option<&str>, entry_data: &str) -> String {
    let prev = prev_hash.unwrap_or(CHAIN_SEED);
    let combined = format!("{prev}|{entry_data}");
    hashing::sha256_hex(combined.as_bytes())
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Key substrings whose values are redacted from audit snapshots.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "authorization",
    "credential",
];

/// Redact sensitive fields from a JSON value, recursing into objects and
/// arrays. Values of matching keys are replaced with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive_fields).collect()),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(field: &str, old: Value, new: Value) -> FieldChange {
        FieldChange {
            field: field.to_string(),
            old,
            new,
            note: None,
        }
    }

    // -----------------------------------------------------------------------
    // Field-to-action mapping
    // -----------------------------------------------------------------------

    #[test]
    fn status_maps_to_status_changed() {
        let c = change("status", json!("open"), json!("resolved"));
        assert_eq!(ticket_field_action(&c), action_types::TICKET_STATUS_CHANGED);
    }

    #[test]
    fn closed_at_set_maps_to_ticket_closed() {
        let c = change("closed_at", Value::Null, json!("2026-08-07T00:00:00Z"));
        assert_eq!(ticket_field_action(&c), action_types::TICKET_CLOSED);
    }

    #[test]
    fn closed_at_cleared_maps_to_ticket_reopened() {
        let c = change("closed_at", json!("2026-08-07T00:00:00Z"), Value::Null);
        assert_eq!(ticket_field_action(&c), action_types::TICKET_REOPENED);
    }

    #[test]
    fn agent_change_maps_to_ticket_assigned() {
        let c = change("agent_id", json!("erin"), json!("frank"));
        assert_eq!(ticket_field_action(&c), action_types::TICKET_ASSIGNED);
    }

    #[test]
    fn title_maps_to_generic_update() {
        let c = change("title", json!("a"), json!("b"));
        assert_eq!(ticket_field_action(&c), action_types::TICKET_UPDATED);
    }

    // -----------------------------------------------------------------------
    // Value serialization
    // -----------------------------------------------------------------------

    #[test]
    fn null_serializes_to_none() {
        assert_eq!(serialize_value(&Value::Null), None);
    }

    #[test]
    fn string_serializes_bare() {
        assert_eq!(serialize_value(&json!("open")), Some("open".to_string()));
    }

    #[test]
    fn structured_value_serializes_as_json() {
        assert_eq!(
            serialize_value(&json!({"priority": "high"})),
            Some(r#"{"priority":"high"}"#.to_string())
        );
        assert_eq!(serialize_value(&json!(42)), Some("42".to_string()));
    }

    // -----------------------------------------------------------------------
    // Integrity hash computation
    // -----------------------------------------------------------------------

    #[test]
    fn first_entry_uses_seed() {
        let hash = compute_integrity_hash(None, "entry_1");
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn chained_entry_differs_from_first() {
        let first = compute_integrity_hash(None, "entry_1");
        let second = compute_integrity_hash(Some(&first), "entry_2");
        assert_ne!(first, second);
    }

    #[test]
    fn same_input_produces_same_hash() {
        assert_eq!(
            compute_integrity_hash(None, "same"),
            compute_integrity_hash(None, "same")
        );
    }

    #[test]
    fn different_prev_hash_produces_different_result() {
        assert_ne!(
            compute_integrity_hash(Some("a"), "same"),
            compute_integrity_hash(Some("b"), "same")
        );
    }

    // -----------------------------------------------------------------------
    // Sensitive field redaction
    // -----------------------------------------------------------------------

    #[test]
    fn redacts_password_hash_field() {
        let input = json!({"username": "alice", "password_hash": "argon2..."});
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["username"], "alice");
        assert_eq!(result["password_hash"], "[REDACTED]");
    }

    #[test]
    fn redacts_nested_and_array_values() {
        let input = json!([{"token": "abc"}, {"outer": {"api_key": "xyz", "name": "ok"}}]);
        let result = redact_sensitive_fields(&input);
        assert_eq!(result[0]["token"], "[REDACTED]");
        assert_eq!(result[1]["outer"]["api_key"], "[REDACTED]");
        assert_eq!(result[1]["outer"]["name"], "ok");
    }

    #[test]
    fn non_object_values_unchanged() {
        assert_eq!(redact_sensitive_fields(&json!("plain")), json!("plain"));
    }
}
