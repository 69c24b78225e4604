use salesdash::BoxError;
use salesdash::app;
use salesdash::config::{DEFAULT_BIND_ADDR, DashboardConfig};

/// Main entry point for the dashboard server
///
/// # Arguments
/// * `[DATA_FILE]` - Spreadsheet to serve (default `Tata_Mahindra_sales.xlsx`, or `SALESDASH_DATA`)
/// * `[BIND_ADDR]` - Listen address (default `127.0.0.1:3000`, or `SALESDASH_ADDR`)
///
/// # Returns
/// * `Result<(), BoxError>` - Fails if the data file cannot be loaded or the port is taken
#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env("SALESDASH_ADDR", DEFAULT_BIND_ADDR)?;

    // Start the web application with the resolved configuration
    app::run(config).await
}
