use genchat::{
    config::Config,
    logger::{self, LoggerConfig},
    server::{self, AppState},
};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env();
    logger::init_with_config(LoggerConfig::from_settings(
        config.log_level.as_deref(),
        config.log_json,
    ))?;

    if dotenv_loaded {
        log::info!(".env file loaded successfully");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &config);

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to initialize services: {}", e);
            return Err(e.into());
        }
    };

    server::run(config, state).await?;
    Ok(())
}
