// Framework bootstrap for the room backend.

use crate::domain::entities::RoomShare;
use crate::domain::ports::{Clock, RoomStore};
use crate::domain::rules::canonical_room_code;
use crate::frameworks::config::{self, SEED_ROOM_TTL_SECONDS, SeedRoom};
use crate::frameworks::db;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, SystemClock};
use std::io::Result;
use std::net::SocketAddr;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serve the backend contract on an already bound listener.
pub async fn run(listener: tokio::net::TcpListener, state: AppState) -> Result<()> {
    let address = listener.local_addr()?;
    let app = app(state);

    tracing::info!(%address, "listening");

    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut state = AppState::in_memory();
    if let Some(database_url) = config::database_url() {
        match db::connect_profile_mirror(&database_url).await {
            Ok(pool) => state.db = Some(pool),
            // The mirror is optional; serve from memory rather than refuse to start.
            Err(e) => tracing::warn!(error = %e, "profile mirror disabled"),
        }
    }

    let seeded = seed_rooms(&state, &config::seed_rooms())
        .await
        .map_err(std::io::Error::other)?;
    tracing::debug!(seeded, "seed rooms loaded");

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, state).await
}

// Registers the given room codes; returns how many were newly created.
pub async fn seed_rooms(state: &AppState, rooms: &[SeedRoom]) -> std::result::Result<usize, String> {
    let store = state.room_store();
    let expires_at = SystemClock.now_epoch_seconds() + SEED_ROOM_TTL_SECONDS;
    let mut created = 0;

    for seed in rooms {
        let Ok(token) = canonical_room_code(&seed.token) else {
            tracing::warn!(token = %seed.token, "skipping seed room with malformed code");
            continue;
        };
        let room = RoomShare {
            token,
            map_id: seed.map_id.clone(),
            map_title: seed.map_title.clone(),
            permissions: seed.permissions,
            max_users: seed.max_users,
            participants: Vec::new(),
            expires_at,
            is_active: true,
            created_by: "seed".to_string(),
        };
        if store.insert_if_absent(room).await? {
            created += 1;
        }
    }

    Ok(created)
}
