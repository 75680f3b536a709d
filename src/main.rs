mod app;
mod domain;
mod infra;
mod simulator;
mod util;

use crate::util::version::{version_label, APP_NAME};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("{APP_NAME} {}", version_label());

    // Anything on the command line is a question for the advisor.
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let query = (!query.trim().is_empty()).then_some(query);

    let config = app::AppConfig::from_env();
    if let Err(err) = app::run(config, query).await {
        log::error!("{err}");
        std::process::exit(1);
    }
}
