//! Field-level snapshot diffing.
//!
//! A snapshot is the full set of an entity's field values at a point in time,
//! represented as a JSON object. [`diff_snapshots`] compares an old and a new
//! snapshot over a fixed, ordered tracked-field list; the resulting change
//! list is the single source of truth for both the audit trail and the
//! notification text of a mutation, so the two can never disagree.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ticket::{closed_at_change, ClosedAtChange};
use crate::types::{DbId, Timestamp};

/// Field values of an entity at a point in time, keyed by field name.
pub type Snapshot = Map<String, Value>;

/// Sentinel rendered for a null assignee.
pub const UNASSIGNED_LABEL: &str = "unassigned";

/* --------------------------------------------------------------------------
Tracked field lists
-------------------------------------------------------------------------- */

/// Mutable ticket fields, in the order changes are reported.
pub const TICKET_FIELDS: &[&str] = &[
    "title",
    "description",
    "status",
    "priority",
    "department_id",
    "agent_id",
];

/// Mutable department fields.
pub const DEPARTMENT_FIELDS: &[&str] = &["name", "description"];

/// Mutable user fields.
pub const USER_FIELDS: &[&str] = &["username", "email", "role", "department_id"];

/* --------------------------------------------------------------------------
FieldChange
-------------------------------------------------------------------------- */

/// A single changed field: its name and the old/new values.
///
/// For decorated ticket diffs, `agent_id` and `department_id` values are
/// already resolved to display names, and derived `closed_at` entries carry
/// a `note` distinguishing a close from a reopen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
    pub note: Option<String>,
}

impl FieldChange {
    /// Human-readable one-line description, e.g.
    /// `status changed from 'open' to 'closed'`.
    pub fn describe(&self) -> String {
        let base = format!(
            "{} changed from {} to {}",
            self.field,
            render(&self.old),
            render(&self.new)
        );
        match &self.note {
            Some(note) => format!("{base} ({note})"),
            None => base,
        }
    }
}

/// Render a JSON value for embedding in a description.
fn render(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

/* --------------------------------------------------------------------------
Generic diff
-------------------------------------------------------------------------- */

/// Compare two snapshots over a fixed tracked-field list.
///
/// Fields absent from `new` mean "no change requested", not a transition to
/// empty. Comparison is deep value equality; unchanged fields are omitted.
/// The output order follows `tracked`.
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot, tracked: &[&str]) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    for &field in tracked {
        let Some(new_value) = new.get(field) else {
            continue;
        };
        let old_value = old.get(field).cloned().unwrap_or(Value::Null);
        if *new_value != old_value {
            changes.push(FieldChange {
                field: field.to_string(),
                old: old_value,
                new: new_value.clone(),
                note: None,
            });
        }
    }
    changes
}

/* --------------------------------------------------------------------------
Ticket decoration
-------------------------------------------------------------------------- */

/// Display labels for foreign keys appearing in ticket diffs.
///
/// Built by the caller from store lookups; missing entries fall back to a
/// `user #id` / `department #id` placeholder so a dangling reference never
/// fails a mutation.
#[derive(Debug, Clone, Default)]
pub struct DisplayLabels {
    pub users: HashMap<DbId, String>,
    pub departments: HashMap<DbId, String>,
}

impl DisplayLabels {
    fn user_label(&self, id: DbId) -> String {
        self.users
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("user #{id}"))
    }

    fn department_label(&self, id: DbId) -> String {
        self.departments
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("department #{id}"))
    }

    /// Resolve an `agent_id` diff side to a display name. Null becomes the
    /// `"unassigned"` sentinel.
    fn agent_value(&self, value: &Value) -> Value {
        match value.as_i64() {
            Some(id) => Value::String(self.user_label(id)),
            None => Value::String(UNASSIGNED_LABEL.to_string()),
        }
    }

    /// Resolve a `department_id` diff side to a display name.
    fn department_value(&self, value: &Value) -> Value {
        match value.as_i64() {
            Some(id) => Value::String(self.department_label(id)),
            None => Value::Null,
        }
    }
}

/// Decorate a raw ticket diff for human consumption.
///
/// - A `status` change derives an additional `closed_at` entry per the
///   status/closed_at invariant, noted as a close or a reopen.
/// - `agent_id` and `department_id` sides are resolved to display names.
///
/// `old_closed_at` is the ticket's `closed_at` before the mutation and `now`
/// is the timestamp stamped on a transition into `closed`.
pub fn decorate_ticket_diff(
    changes: Vec<FieldChange>,
    labels: &DisplayLabels,
    old_closed_at: Option<Timestamp>,
    now: Timestamp,
) -> Vec<FieldChange> {
    let mut decorated = Vec::with_capacity(changes.len() + 1);

    for change in changes {
        match change.field.as_str() {
            "status" => {
                let old_status = change.old.as_str().unwrap_or_default().to_string();
                let new_status = change.new.as_str().unwrap_or_default().to_string();
                decorated.push(change);

                let old_value = match old_closed_at {
                    Some(ts) => Value::String(ts.to_rfc3339()),
                    None => Value::Null,
                };
                match closed_at_change(&old_status, &new_status) {
                    ClosedAtChange::Set => decorated.push(FieldChange {
                        field: "closed_at".to_string(),
                        old: old_value,
                        new: Value::String(now.to_rfc3339()),
                        note: Some("ticket closed".to_string()),
                    }),
                    ClosedAtChange::Clear => decorated.push(FieldChange {
                        field: "closed_at".to_string(),
                        old: old_value,
                        new: Value::Null,
                        note: Some("ticket reopened".to_string()),
                    }),
                    ClosedAtChange::Unchanged => {}
                }
            }
            "agent_id" => decorated.push(FieldChange {
                old: labels.agent_value(&change.old),
                new: labels.agent_value(&change.new),
                ..change
            }),
            "department_id" => decorated.push(FieldChange {
                old: labels.department_value(&change.old),
                new: labels.department_value(&change.new),
                ..change
            }),
            _ => decorated.push(change),
        }
    }

    decorated
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> Snapshot {
        value.as_object().expect("object").clone()
    }

    #[test]
    fn single_changed_field_yields_single_entry() {
        let old = snapshot(json!({"title": "a", "status": "open"}));
        let new = snapshot(json!({"title": "b", "status": "open"}));
        let changes = diff_snapshots(&old, &new, TICKET_FIELDS);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "title");
        assert_eq!(changes[0].old, json!("a"));
        assert_eq!(changes[0].new, json!("b"));
    }

    #[test]
    fn missing_new_side_field_is_no_change() {
        let old = snapshot(json!({"title": "a", "status": "open"}));
        let new = snapshot(json!({"status": "resolved"}));
        let changes = diff_snapshots(&old, &new, TICKET_FIELDS);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "status");
    }

    #[test]
    fn identical_snapshots_yield_empty_diff() {
        let old = snapshot(json!({"title": "a", "priority": "low"}));
        let changes = diff_snapshots(&old, &old.clone(), TICKET_FIELDS);
        assert!(changes.is_empty());
    }

    #[test]
    fn output_follows_tracked_field_order() {
        let old = snapshot(json!({"title": "a", "status": "open", "priority": "low"}));
        let new = snapshot(json!({"priority": "high", "title": "b", "status": "resolved"}));
        let fields: Vec<_> = diff_snapshots(&old, &new, TICKET_FIELDS)
            .into_iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(fields, vec!["title", "status", "priority"]);
    }

    #[test]
    fn untracked_fields_ignored() {
        let old = snapshot(json!({"title": "a", "internal": 1}));
        let new = snapshot(json!({"title": "a", "internal": 2}));
        assert!(diff_snapshots(&old, &new, TICKET_FIELDS).is_empty());
    }

    #[test]
    fn closing_derives_closed_at_entry() {
        let old = snapshot(json!({"status": "open"}));
        let new = snapshot(json!({"status": "closed"}));
        let now = chrono::Utc::now();
        let changes = decorate_ticket_diff(
            diff_snapshots(&old, &new, TICKET_FIELDS),
            &DisplayLabels::default(),
            None,
            now,
        );

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "status");
        assert_eq!(changes[1].field, "closed_at");
        assert_eq!(changes[1].old, Value::Null);
        assert_eq!(changes[1].new, json!(now.to_rfc3339()));
        assert_eq!(changes[1].note.as_deref(), Some("ticket closed"));
    }

    #[test]
    fn reopening_derives_cleared_closed_at_entry() {
        let closed_at = chrono::Utc::now();
        let old = snapshot(json!({"status": "closed"}));
        let new = snapshot(json!({"status": "open"}));
        let changes = decorate_ticket_diff(
            diff_snapshots(&old, &new, TICKET_FIELDS),
            &DisplayLabels::default(),
            Some(closed_at),
            chrono::Utc::now(),
        );

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].field, "closed_at");
        assert_eq!(changes[1].old, json!(closed_at.to_rfc3339()));
        assert_eq!(changes[1].new, Value::Null);
        assert_eq!(changes[1].note.as_deref(), Some("ticket reopened"));
    }

    #[test]
    fn status_change_between_open_states_has_no_derived_entry() {
        let old = snapshot(json!({"status": "open"}));
        let new = snapshot(json!({"status": "in-progress"}));
        let changes = decorate_ticket_diff(
            diff_snapshots(&old, &new, TICKET_FIELDS),
            &DisplayLabels::default(),
            None,
            chrono::Utc::now(),
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "status");
    }

    #[test]
    fn agent_change_resolves_display_names() {
        let mut labels = DisplayLabels::default();
        labels.users.insert(20, "erin".to_string());
        labels.users.insert(21, "frank".to_string());

        let old = snapshot(json!({"agent_id": 20}));
        let new = snapshot(json!({"agent_id": 21}));
        let changes = decorate_ticket_diff(
            diff_snapshots(&old, &new, TICKET_FIELDS),
            &labels,
            None,
            chrono::Utc::now(),
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].old, json!("erin"));
        assert_eq!(changes[0].new, json!("frank"));
    }

    #[test]
    fn unassignment_renders_unassigned_sentinel() {
        let mut labels = DisplayLabels::default();
        labels.users.insert(20, "erin".to_string());

        let old = snapshot(json!({"agent_id": 20}));
        let new = snapshot(json!({"agent_id": null}));
        let changes = decorate_ticket_diff(
            diff_snapshots(&old, &new, TICKET_FIELDS),
            &labels,
            None,
            chrono::Utc::now(),
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].old, json!("erin"));
        assert_eq!(changes[0].new, json!(UNASSIGNED_LABEL));
    }

    #[test]
    fn department_change_resolves_names() {
        let mut labels = DisplayLabels::default();
        labels.departments.insert(1, "Billing".to_string());
        labels.departments.insert(2, "Support".to_string());

        let old = snapshot(json!({"department_id": 1}));
        let new = snapshot(json!({"department_id": 2}));
        let changes = decorate_ticket_diff(
            diff_snapshots(&old, &new, TICKET_FIELDS),
            &labels,
            None,
            chrono::Utc::now(),
        );

        assert_eq!(changes[0].old, json!("Billing"));
        assert_eq!(changes[0].new, json!("Support"));
    }

    #[test]
    fn unknown_ids_fall_back_to_placeholders() {
        let old = snapshot(json!({"agent_id": null}));
        let new = snapshot(json!({"agent_id": 77}));
        let changes = decorate_ticket_diff(
            diff_snapshots(&old, &new, TICKET_FIELDS),
            &DisplayLabels::default(),
            None,
            chrono::Utc::now(),
        );
        assert_eq!(changes[0].new, json!("user #77"));
    }

    #[test]
    fn describe_renders_readably() {
        let change = FieldChange {
            field: "status".to_string(),
            old: json!("open"),
            new: json!("closed"),
            note: None,
        };
        assert_eq!(change.describe(), "status changed from 'open' to 'closed'");

        let derived = FieldChange {
            field: "closed_at".to_string(),
            old: Value::Null,
            new: json!("2026-08-07T12:00:00+00:00"),
            note: Some("ticket closed".to_string()),
        };
        assert_eq!(
            derived.describe(),
            "closed_at changed from none to '2026-08-07T12:00:00+00:00' (ticket closed)"
        );
    }
}
