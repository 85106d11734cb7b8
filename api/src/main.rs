//! Video Keeper - binary entry point

use video_keeper::{config::AppConfig, logging};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(config.environment);

    if let Err(e) = video_keeper::run(config).await {
        tracing::error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}
