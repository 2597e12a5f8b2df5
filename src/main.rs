use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use weatherdash::{
    Dashboard, DashboardConfig, ForecastService, LocationResolver, VERSION, WeatherApiClient,
    logging, web,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DashboardConfig::load().context("Failed to load configuration")?;
    logging::init(&config.logging)?;

    info!("Starting WeatherDash {}", VERSION);

    let api_client =
        WeatherApiClient::from_config(&config).context("Failed to create weather API client")?;
    let dashboard = Dashboard::new(
        Arc::new(LocationResolver::new(api_client.clone())),
        Arc::new(ForecastService::new(api_client)),
    );

    web::run(&config.server, Arc::new(dashboard)).await
}
