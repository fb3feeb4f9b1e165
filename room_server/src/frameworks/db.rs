use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

// Connect the profile mirror and bring its schema up to date.
pub async fn connect_profile_mirror(database_url: &str) -> Result<PgPool, String> {
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|e| format!("failed to connect to database: {e}"))?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| format!("failed to run migrations: {e}"))?;

    Ok(pool)
}
