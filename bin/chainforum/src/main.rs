//! # chainforum Binary
//!
//! Assembles the forum from settings and compile-time ledger features, then
//! serves the REST API.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use cf_api::{configure_routes, middleware, AppState, ElectionScheduler};
use cf_contract::Gateway;
use cf_core::traits::Ledger;
use configs::Settings;

#[cfg(feature = "ledger-memory")]
use cf_ledger_memory::MemoryLedger;

#[cfg(feature = "ledger-sqlite")]
use cf_ledger_sqlite::SqliteLedger;

#[cfg(feature = "ledger-memory")]
fn memory_ledger() -> anyhow::Result<Arc<dyn Ledger>> {
    log::warn!("using the in-memory ledger; state is lost on exit");
    Ok(Arc::new(MemoryLedger::new()))
}

#[cfg(not(feature = "ledger-memory"))]
fn memory_ledger() -> anyhow::Result<Arc<dyn Ledger>> {
    anyhow::bail!("ledger.url = memory requires the ledger-memory feature")
}

#[cfg(feature = "ledger-sqlite")]
async fn sqlite_ledger(url: &str) -> anyhow::Result<Arc<dyn Ledger>> {
    Ok(Arc::new(SqliteLedger::new(url).await?))
}

#[cfg(not(feature = "ledger-sqlite"))]
async fn sqlite_ledger(url: &str) -> anyhow::Result<Arc<dyn Ledger>> {
    anyhow::bail!("ledger.url {} requires the ledger-sqlite feature", url)
}

async fn open_ledger(settings: &Settings) -> anyhow::Result<Arc<dyn Ledger>> {
    if settings.ledger.is_memory() {
        memory_ledger()
    } else {
        sqlite_ledger(&settings.ledger.url).await
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(settings.log.filter.as_str()));

    let ledger = open_ledger(&settings).await?;
    let gateway = Gateway::new(ledger);

    let scheduler = ElectionScheduler::new(
        gateway.clone(),
        settings.election.initial_delay(),
        settings.election.period(),
    );
    if let Err(err) = scheduler.schedule_all().await {
        log::error!("could not schedule moderator elections: {}", err);
    }

    let state = web::Data::new(AppState { gateway, scheduler: scheduler.clone() });
    let (host, port) = settings.bind_addr();
    log::info!("chainforum starting on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    scheduler.shutdown();
    Ok(())
}
