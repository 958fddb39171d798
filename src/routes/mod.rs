use uuid::Uuid;

pub mod appointments;
pub mod auth;
pub mod health;
pub mod hospitals;

/// Parse a path identifier; anything that is not a UUID cannot name a record.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
