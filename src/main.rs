use std::sync::Arc;

use anyhow::Context;

use v3_swap_router::{bootstrap, config, web};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Load configuration
    let config = config::Config::from_env().context("failed to load configuration")?;

    // Build application state
    let app_state = Arc::new(bootstrap::AppState::new(&config).context("failed to initialize application state")?);
    log::info!(
        "router {:#x} on chain {}, listening on port {}",
        app_state.swap_router,
        app_state.chain_id,
        config.port
    );

    // Configure Rocket
    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .manage(app_state)
        .mount("/", web::routes::all())
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("rocket failed: {}", e))?;
    Ok(())
}
