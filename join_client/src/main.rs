#[tokio::main]
async fn main() {
    if let Err(e) = join_client::run().await {
        tracing::error!(error = %e, "join failed");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
