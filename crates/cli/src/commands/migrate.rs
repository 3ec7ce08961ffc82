//! Database migration commands.
//!
//! Migration files live in `crates/marketplace/migrations/` and are embedded
//! into the binary at compile time, so the CLI can run anywhere with only a
//! database URL.
//!
//! # Environment Variables
//!
//! - `TOWNSQUARE_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use tracing::info;

use super::{CommandError, connect};

/// Run marketplace database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn marketplace() -> Result<(), CommandError> {
    info!("Connecting to marketplace database...");
    let pool = connect().await?;

    info!("Running marketplace migrations...");
    sqlx::migrate!("../marketplace/migrations").run(&pool).await?;

    info!("Marketplace migrations complete");
    Ok(())
}
