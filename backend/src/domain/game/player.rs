//! Players of a universe.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A player registered in a universe by an API user.
///
/// Names are unique within a universe.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: Uuid,
    pub api_user: Uuid,
    pub universe: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}
