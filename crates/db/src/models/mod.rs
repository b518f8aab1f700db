//! Entity models and DTOs.

pub mod activity;
pub mod comment;
pub mod department;
pub mod notification;
pub mod ticket;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Annotate `Option<Option<T>>` fields with
/// `#[serde(default, deserialize_with = "double_option")]`: a missing key
/// stays `None` (no change requested), an explicit `null` becomes
/// `Some(None)` (clear the value).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
