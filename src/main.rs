use std::sync::Arc;

use anyhow::{Context, Result};
use recepti_sdk::{actions::RecipeActions, config::Config, postgres::PgStore, routes};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().context("Invalid configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the database")?;

    let store = PgStore::new(pool);
    store.migrate().await.context("Failed to run migrations")?;

    let actions = RecipeActions::new(Arc::new(store), config.cdn_base_url.to_owned());

    log::info!("Listening on {}", config.bind_address);
    warp::serve(routes::routes(actions, &config))
        .run(config.bind_address)
        .await;

    Ok(())
}
