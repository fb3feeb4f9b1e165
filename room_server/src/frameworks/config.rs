use std::env;

use crate::domain::entities::Permission;

// Runtime/server settings read from the environment.

pub fn http_port() -> u16 {
    env::var("ROOM_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3003)
}

pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty())
}

// Seeded rooms stay open for thirty days.
pub const SEED_ROOM_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

// Room code created at startup, for local development and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRoom {
    pub token: String,
    pub map_id: String,
    pub map_title: String,
    pub max_users: u32,
    pub permissions: Permission,
}

pub fn seed_rooms() -> Vec<SeedRoom> {
    env::var("SEED_ROOMS")
        .map(|raw| parse_seed_rooms(&raw))
        .unwrap_or_default()
}

// Parses `CODE:map_id:title:max_users` entries separated by commas.
// Malformed entries are skipped with a warning.
pub fn parse_seed_rooms(raw: &str) -> Vec<SeedRoom> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = parse_seed_room(entry);
            if parsed.is_none() {
                tracing::warn!(entry, "ignoring malformed SEED_ROOMS entry");
            }
            parsed
        })
        .collect()
}

fn parse_seed_room(entry: &str) -> Option<SeedRoom> {
    let mut parts = entry.splitn(4, ':');
    let token = parts.next()?.trim().to_string();
    let map_id = parts.next()?.trim().to_string();
    let map_title = parts.next()?.trim().to_string();
    let max_users = parts.next()?.trim().parse().ok()?;
    if token.is_empty() || map_id.is_empty() || map_title.is_empty() {
        return None;
    }

    Some(SeedRoom {
        token,
        map_id,
        map_title,
        max_users,
        permissions: Permission::Edit,
    })
}
