mod config;
mod handlers;
mod models;
mod nutrition;
mod report;
#[cfg(feature = "http-server")]
mod server;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::AnalysisHandler;
use services::{AdvisoryClient, AdvisoryService, HistoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🥗 Starting Calorie Advisor...");

    // Validate configuration before anything talks to the network
    let config = Config::from_env()?;

    let store = Arc::new(HistoryStore::new(&config.database_url).await?);
    log::info!("✅ History store initialized ({})", config.database_url);

    let advisor: Arc<dyn AdvisoryService> =
        Arc::new(AdvisoryClient::new(config.api_key.clone(), config.model.clone()));
    log::info!("✅ Advisory client initialized with model: {}", config.model);

    let handler = Arc::new(AnalysisHandler::new(store.clone(), advisor.clone()));
    log::info!("✅ Analysis handler initialized");

    #[cfg(feature = "http-server")]
    {
        let app = server::create_router(handler.clone());
        let bind_addr = config.bind_addr.clone();

        log::info!("🌐 HTTP server starting on {}", bind_addr);

        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&bind_addr)
                .await
                .expect("Failed to bind HTTP server");
            axum::serve(listener, app)
                .await
                .expect("Failed to start HTTP server");
        });

        log::info!("✅ HTTP server started");
    }

    log::info!("🎉 Calorie Advisor is ready!");

    // Keep running
    tokio::signal::ctrl_c().await?;

    log::info!("🛑 Shutting down...");

    Ok(())
}
