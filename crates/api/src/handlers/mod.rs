//! Request handlers.
//!
//! Handlers are thin: they authenticate, parse, and delegate. Every
//! mutation goes through the shared pipeline; read-only endpoints query the
//! repositories directly, gated by the same policy evaluator the pipeline
//! uses.

pub mod activity;
pub mod auth;
pub mod departments;
pub mod notifications;
pub mod tickets;
pub mod users;
