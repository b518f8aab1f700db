//! Shared helpers for the pipeline test suites.
//!
//! Each suite runs the real [`MutationPipeline`] against a fresh
//! [`MemoryStore`] -- no database, no HTTP server.

#![allow(dead_code)]

use std::sync::Arc;

use helpdesk_api::pipeline::MutationPipeline;
use helpdesk_core::notify::FanoutPolicy;
use helpdesk_core::policy::Actor;
use helpdesk_db::models::ticket::CreateTicket;
use helpdesk_db::models::user::User;
use helpdesk_db::store::MemoryStore;

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub pipeline: MutationPipeline<MemoryStore>,
}

/// Pipeline over a fresh in-memory store with the default fan-out policy.
pub fn env() -> TestEnv {
    env_with(FanoutPolicy::default())
}

/// Pipeline over a fresh in-memory store with a custom fan-out policy.
pub fn env_with(fanout: FanoutPolicy) -> TestEnv {
    let store = Arc::new(MemoryStore::new());
    let pipeline = MutationPipeline::new(Arc::clone(&store), fanout);
    TestEnv { store, pipeline }
}

/// The policy-evaluator view of a seeded user.
pub fn actor(user: &User) -> Actor {
    Actor::new(user.id, user.username.clone(), user.role.clone())
}

/// A minimal valid create-ticket request.
pub fn new_ticket_request(department_id: i64) -> CreateTicket {
    CreateTicket {
        title: "Printer on fire".to_string(),
        description: "Third floor, hurry".to_string(),
        priority: None,
        department_id,
        user_id: None,
    }
}
