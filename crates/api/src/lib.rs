//! HTTP layer and mutation pipeline for the helpdesk backend.
//!
//! Handlers are thin axum adapters: they authenticate the actor, parse the
//! request, and delegate every create/update/delete to the shared
//! [`pipeline::MutationPipeline`], which sequences policy check -> store write
//! -> diff -> audit -> notify. Read-only endpoints go straight to the
//! repositories, gated by the same policy evaluator.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod response;
pub mod routes;
pub mod state;
