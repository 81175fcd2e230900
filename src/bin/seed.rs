// Populates a fresh database with demo users and posts
use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use threaded_posts::auth::AuthService;
use threaded_posts::db::DatabaseClient;
use threaded_posts::services::SeedConfig;
use threaded_posts::{AppConfig, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let Some(database_url) = config.database_url.clone() else {
        bail!("DATABASE_URL must be set for seeding");
    };

    let db = DatabaseClient::connect_postgres(&database_url, &config)
        .await
        .context("failed to connect to the database")?;
    let app_state = AppState::from_parts(config, db, Arc::new(AuthService::new()));

    let seed_config = SeedConfig::from_env();
    info!("Seeding {} users and {} posts", seed_config.user_count, seed_config.post_count);

    let mut rng = StdRng::from_entropy();
    let report = app_state.seed_service()
        .run(&seed_config, &mut rng)
        .await
        .context("seeding aborted")?;

    info!("✅ Seeding complete: {} users, {} posts", report.users_created, report.posts_created);
    Ok(())
}
