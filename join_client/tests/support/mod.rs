// Shared one-time room_server bootstrap for the join flow integration tests.
use room_server::domain::Permission;
use room_server::{AppState, SeedRoom};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

// Room codes every test can rely on; each test uses its own code.
pub const OPEN_ROOM: &str = "XYZ789";
pub const MEMBER_ROOM: &str = "ABC123";
pub const SINGLE_SEAT_ROOM: &str = "FUL100";
pub const UPGRADE_ROOM: &str = "UPG321";
pub const SIGN_IN_ROOM: &str = "SGN654";

// Base URL published once the server has bound its ephemeral port.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// Guards the bootstrap so it runs once per test binary.
static SERVER_READY: OnceLock<()> = OnceLock::new();

fn seed() -> Vec<SeedRoom> {
    let room = |token: &str, map_id: &str, map_title: &str, max_users: u32| SeedRoom {
        token: token.to_string(),
        map_id: map_id.to_string(),
        map_title: map_title.to_string(),
        max_users,
        permissions: Permission::Edit,
    };

    vec![
        room(OPEN_ROOM, "map-open", "Product Roadmap", 10),
        room(MEMBER_ROOM, "map-member", "Team Retro", 10),
        room(SINGLE_SEAT_ROOM, "map-single", "One on One", 1),
        room(UPGRADE_ROOM, "map-upgrade", "Onboarding", 10),
        room(SIGN_IN_ROOM, "map-sign-in", "Launch Plan", 10),
    ]
}

// Ensure the backend is running and return its base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);

        // A dedicated OS thread keeps the server alive across `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let state = AppState::in_memory();
                room_server::seed_rooms(&state, &seed())
                    .await
                    .expect("seed rooms");

                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{addr}"));

                room_server::run(listener, state)
                    .await
                    .expect("server failed");
            });
        });

        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Wait for URL publication, then for the socket to accept TCP connections.
fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("room server did not become ready in time");
}
