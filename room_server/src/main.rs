#[tokio::main]
async fn main() {
    if let Err(e) = room_server::run_with_config().await {
        tracing::error!(error = %e, "room server stopped");
        std::process::exit(1);
    }
}
