//! Fan-out behaviour: comment notifications, the configurable unassignment
//! policy, and the best-effort contract of audit/notification side effects.

mod common;

use common::{actor, env, env_with, new_ticket_request};
use helpdesk_core::notify::FanoutPolicy;
use helpdesk_core::roles::{ROLE_AGENT, ROLE_ADMIN, ROLE_CLIENT};
use helpdesk_db::models::ticket::UpdateTicket;
use helpdesk_db::store::EntityStore;

#[tokio::test]
async fn comment_notifies_owner_and_assigned_agent() {
    let t = env();
    let department = t.store.seed_department("Support");
    let admin = t.store.seed_user("root", ROLE_ADMIN, None);
    let agent = t.store.seed_user("erin", ROLE_AGENT, Some(department.id));
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .unwrap();
    let assign = UpdateTicket {
        agent_id: Some(Some(agent.id)),
        ..Default::default()
    };
    t.pipeline
        .update_ticket(&actor(&admin), ticket.id, &assign)
        .await
        .unwrap();
    let before = t.store.notifications().len();

    t.pipeline
        .add_comment(&actor(&admin), ticket.id, "escalating this")
        .await
        .unwrap();

    let notifications = t.store.notifications();
    let new: Vec<i64> = notifications[before..].iter().map(|n| n.user_id).collect();
    assert_eq!(new, vec![client.id, agent.id]);
    assert!(notifications[before..]
        .iter()
        .all(|n| n.kind == "comment_added"));
}

#[tokio::test]
async fn comment_by_owner_on_unassigned_ticket_is_silent() {
    let t = env();
    let department = t.store.seed_department("Support");
    t.store.seed_user("root", ROLE_ADMIN, None);
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .unwrap();
    let before = t.store.notifications().len();

    t.pipeline
        .add_comment(&actor(&client), ticket.id, "still broken")
        .await
        .unwrap();

    assert_eq!(t.store.notifications().len(), before);
}

#[tokio::test]
async fn comment_on_orphaned_conversation_surfaces_to_admins() {
    let t = env();
    let department = t.store.seed_department("Support");
    let admin1 = t.store.seed_user("root", ROLE_ADMIN, None);
    let admin2 = t.store.seed_user("ops", ROLE_ADMIN, None);
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .unwrap();
    let before = t.store.notifications().len();

    // admin1 comments on an unassigned ticket they do not own: the owner
    // hears about it, and so do the remaining admins.
    t.pipeline
        .add_comment(&actor(&admin1), ticket.id, "taking a look")
        .await
        .unwrap();

    let notifications = t.store.notifications();
    let new: Vec<i64> = notifications[before..].iter().map(|n| n.user_id).collect();
    assert_eq!(new, vec![client.id, admin2.id]);
}

#[tokio::test]
async fn comment_preview_is_truncated_in_message() {
    let t = env();
    let department = t.store.seed_department("Support");
    let agent = t.store.seed_user("erin", ROLE_AGENT, Some(department.id));
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .unwrap();
    let assign = UpdateTicket {
        agent_id: Some(Some(agent.id)),
        ..Default::default()
    };
    let admin = t.store.seed_user("root", ROLE_ADMIN, None);
    t.pipeline
        .update_ticket(&actor(&admin), ticket.id, &assign)
        .await
        .unwrap();
    let before = t.store.notifications().len();

    let long_comment = "x".repeat(300);
    t.pipeline
        .add_comment(&actor(&client), ticket.id, &long_comment)
        .await
        .unwrap();

    let notifications = t.store.notifications();
    let message = &notifications[before..][0].message;
    assert!(message.contains("..."));
    assert!(message.len() < long_comment.len());
}

#[tokio::test]
async fn unassignment_is_silent_by_default_but_configurable() {
    // Default policy: no notification on unassignment.
    let t = env();
    let department = t.store.seed_department("Support");
    let admin = t.store.seed_user("root", ROLE_ADMIN, None);
    let agent = t.store.seed_user("erin", ROLE_AGENT, Some(department.id));
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .unwrap();
    let assign = UpdateTicket {
        agent_id: Some(Some(agent.id)),
        ..Default::default()
    };
    t.pipeline
        .update_ticket(&actor(&admin), ticket.id, &assign)
        .await
        .unwrap();
    let before = t.store.notifications().len();

    let unassign = UpdateTicket {
        agent_id: Some(None),
        ..Default::default()
    };
    t.pipeline
        .update_ticket(&actor(&admin), ticket.id, &unassign)
        .await
        .unwrap();
    assert_eq!(t.store.notifications().len(), before);

    // Opt-in policy: the previously assigned agent hears about it.
    let t = env_with(FanoutPolicy {
        notify_unassigned_agent: true,
    });
    let department = t.store.seed_department("Support");
    let admin = t.store.seed_user("root", ROLE_ADMIN, None);
    let agent = t.store.seed_user("erin", ROLE_AGENT, Some(department.id));
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .unwrap();
    let assign = UpdateTicket {
        agent_id: Some(Some(agent.id)),
        ..Default::default()
    };
    t.pipeline
        .update_ticket(&actor(&admin), ticket.id, &assign)
        .await
        .unwrap();
    let before = t.store.notifications().len();

    let unassign = UpdateTicket {
        agent_id: Some(None),
        ..Default::default()
    };
    t.pipeline
        .update_ticket(&actor(&admin), ticket.id, &unassign)
        .await
        .unwrap();

    let notifications = t.store.notifications();
    let new: Vec<i64> = notifications[before..].iter().map(|n| n.user_id).collect();
    assert_eq!(new, vec![agent.id]);
}

#[tokio::test]
async fn one_failed_recipient_does_not_block_the_others() {
    let t = env();
    let department = t.store.seed_department("Support");
    let admin1 = t.store.seed_user("root", ROLE_ADMIN, None);
    let admin2 = t.store.seed_user("ops", ROLE_ADMIN, None);
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);

    // admin1's notification write fails; admin2's must still land, and the
    // mutation itself must succeed.
    t.store.set_fail_notifications_for(Some(admin1.id));
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .expect("mutation must succeed despite a notification failure");

    let recipients: Vec<i64> = t.store.notifications().iter().map(|n| n.user_id).collect();
    assert_eq!(recipients, vec![admin2.id]);
    assert!(t
        .store
        .get_ticket(ticket.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn audit_failure_does_not_abort_the_mutation() {
    let t = env();
    let department = t.store.seed_department("Support");
    let admin = t.store.seed_user("root", ROLE_ADMIN, None);
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .unwrap();
    let audit_before = t.store.activity().len();
    let notifications_before = t.store.notifications().len();

    t.store.set_fail_activity(true);
    let update = UpdateTicket {
        priority: Some("high".to_string()),
        ..Default::default()
    };
    let updated = t
        .pipeline
        .update_ticket(&actor(&admin), ticket.id, &update)
        .await
        .expect("mutation must succeed despite audit failure");

    assert_eq!(updated.priority, "high");
    assert_eq!(t.store.activity().len(), audit_before, "no entry was written");
    // Notifications are independent of the audit failure.
    assert_eq!(t.store.notifications().len(), notifications_before + 1);
}

#[tokio::test]
async fn audit_entries_chain_integrity_hashes() {
    let t = env();
    let department = t.store.seed_department("Support");
    let admin = t.store.seed_user("root", ROLE_ADMIN, None);
    let client = t.store.seed_user("carol", ROLE_CLIENT, None);
    let ticket = t
        .pipeline
        .create_ticket(&actor(&client), &new_ticket_request(department.id))
        .await
        .unwrap();
    let update = UpdateTicket {
        priority: Some("high".to_string()),
        ..Default::default()
    };
    t.pipeline
        .update_ticket(&actor(&admin), ticket.id, &update)
        .await
        .unwrap();

    let activity = t.store.activity();
    assert!(activity.len() >= 2);
    let hashes: Vec<&str> = activity
        .iter()
        .map(|e| e.integrity_hash.as_deref().expect("hash present"))
        .collect();
    for hash in &hashes {
        assert_eq!(hash.len(), 64);
    }
    // Every hash chains over the previous one, so no two can collide.
    for pair in hashes.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}
