//! Tests for the in-memory entity store.
//!
//! The pipeline suites in `helpdesk-api` lean on `MemoryStore` mirroring
//! Postgres semantics; these tests pin down the parts that matter: unique
//! conflicts, the optimistic ticket update check, and cascade helpers.

use helpdesk_core::error::CoreError;
use helpdesk_core::roles::{ROLE_AGENT, ROLE_CLIENT};
use helpdesk_core::ticket::{PRIORITY_MEDIUM, STATUS_OPEN};
use helpdesk_db::models::activity::NewActivityEntry;
use helpdesk_db::models::department::CreateDepartment;
use helpdesk_db::models::notification::NewNotification;
use helpdesk_db::models::ticket::{NewTicket, TicketWrite};
use helpdesk_db::models::user::NewUser;
use helpdesk_db::store::{EntityStore, MemoryStore};

fn new_ticket(department_id: i64, user_id: i64) -> NewTicket {
    NewTicket {
        title: "Printer on fire".to_string(),
        description: "Third floor".to_string(),
        status: STATUS_OPEN.to_string(),
        priority: PRIORITY_MEDIUM.to_string(),
        department_id,
        user_id,
        agent_id: None,
    }
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "unused".to_string(),
        role: ROLE_CLIENT.to_string(),
        department_id: None,
    }
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let store = MemoryStore::new();
    store.insert_user(&new_user("alice")).await.unwrap();

    let mut dup = new_user("alice");
    dup.email = "other@example.com".to_string();
    let err = store.insert_user(&dup).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn duplicate_department_name_conflicts() {
    let store = MemoryStore::new();
    store
        .insert_department(&CreateDepartment {
            name: "Billing".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let err = store
        .insert_department(&CreateDepartment {
            name: "Billing".to_string(),
            description: Some("again".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn ticket_update_applies_staged_fields() {
    let store = MemoryStore::new();
    let department = store.seed_department("Support");
    let client = store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = store
        .insert_ticket(&new_ticket(department.id, client.id))
        .await
        .unwrap();

    let write = TicketWrite {
        status: Some("in-progress".to_string()),
        ..Default::default()
    };
    let updated = store
        .update_ticket(ticket.id, &write, ticket.updated_at)
        .await
        .unwrap()
        .expect("update should match");

    assert_eq!(updated.status, "in-progress");
    assert_eq!(updated.title, ticket.title);
    assert!(updated.updated_at >= ticket.updated_at);
}

#[tokio::test]
async fn stale_ticket_update_is_rejected() {
    let store = MemoryStore::new();
    let department = store.seed_department("Support");
    let client = store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = store
        .insert_ticket(&new_ticket(department.id, client.id))
        .await
        .unwrap();

    // First writer wins.
    let write = TicketWrite {
        priority: Some("high".to_string()),
        ..Default::default()
    };
    store
        .update_ticket(ticket.id, &write, ticket.updated_at)
        .await
        .unwrap()
        .expect("first update should match");

    // Second writer holds the stale snapshot and must miss.
    let stale = store
        .update_ticket(ticket.id, &write, ticket.updated_at)
        .await
        .unwrap();
    assert!(stale.is_none());
}

#[tokio::test]
async fn update_of_missing_ticket_returns_none() {
    let store = MemoryStore::new();
    let result = store
        .update_ticket(999, &TicketWrite::default(), chrono::Utc::now())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn cascade_helpers_report_removed_counts() {
    let store = MemoryStore::new();
    let department = store.seed_department("Support");
    let client = store.seed_user("carol", ROLE_CLIENT, None);
    let agent = store.seed_user("erin", ROLE_AGENT, Some(department.id));
    let ticket = store
        .insert_ticket(&new_ticket(department.id, client.id))
        .await
        .unwrap();

    store
        .insert_comment(ticket.id, client.id, "any update?")
        .await
        .unwrap();
    store
        .insert_comment(ticket.id, agent.id, "looking into it")
        .await
        .unwrap();
    store
        .insert_notification(&NewNotification {
            user_id: agent.id,
            message: "ticket filed".to_string(),
            kind: "ticket_created".to_string(),
            related_id: Some(ticket.id),
            related_type: Some("ticket".to_string()),
        })
        .await
        .unwrap();
    store
        .append_activity(&NewActivityEntry {
            actor_id: client.id,
            actor_username: "carol".to_string(),
            actor_role: ROLE_CLIENT.to_string(),
            action_type: "ticket_created".to_string(),
            description: "created".to_string(),
            target_type: "ticket".to_string(),
            target_id: ticket.id,
            old_value: None,
            new_value: None,
            integrity_hash: None,
        })
        .await
        .unwrap();

    assert_eq!(
        store
            .delete_notifications_for_related("ticket", ticket.id)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        store
            .delete_activity_for_target("ticket", ticket.id)
            .await
            .unwrap(),
        1
    );
    assert_eq!(store.delete_comments_for_ticket(ticket.id).await.unwrap(), 2);
    assert!(store.delete_ticket(ticket.id).await.unwrap());
    assert!(!store.delete_ticket(ticket.id).await.unwrap());
}

#[tokio::test]
async fn activity_hash_chain_tracks_last_entry() {
    let store = MemoryStore::new();
    assert_eq!(store.last_activity_hash().await.unwrap(), None);

    store
        .append_activity(&NewActivityEntry {
            actor_id: 1,
            actor_username: "root".to_string(),
            actor_role: "admin".to_string(),
            action_type: "user_created".to_string(),
            description: "created".to_string(),
            target_type: "user".to_string(),
            target_id: 2,
            old_value: None,
            new_value: None,
            integrity_hash: Some("abc".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(
        store.last_activity_hash().await.unwrap(),
        Some("abc".to_string())
    );
}

#[tokio::test]
async fn injected_failures_surface_as_errors() {
    let store = MemoryStore::new();
    store.set_fail_activity(true);
    let err = store
        .append_activity(&NewActivityEntry {
            actor_id: 1,
            actor_username: "root".to_string(),
            actor_role: "admin".to_string(),
            action_type: "user_created".to_string(),
            description: "created".to_string(),
            target_type: "user".to_string(),
            target_id: 2,
            old_value: None,
            new_value: None,
            integrity_hash: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Internal(_)));

    store.set_fail_notifications_for(Some(7));
    let err = store
        .insert_notification(&NewNotification {
            user_id: 7,
            message: "m".to_string(),
            kind: "ticket_updated".to_string(),
            related_id: None,
            related_type: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Internal(_)));
}
