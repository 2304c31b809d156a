use std::fs;
use std::io::Read;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uniswap_price_analyzer::{
    config::{LoggingSettings, Settings},
    services::{AnalysisRequest, TokenAnalyzer},
    AppError,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new()?;
    init_logging(&settings.logging);

    info!("🚀 Starting Uniswap price analyzer");

    if let Err(e) = run(&settings) {
        error!("Analysis failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}

/// Logs go to stderr; stdout carries only the JSON report.
fn init_logging(logging: &LoggingSettings) {
    let level = logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("uniswap_price_analyzer={}", level).into())
    };

    if logging.json {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn run(settings: &Settings) -> Result<(), AppError> {
    let raw = match settings.input.batch_path.as_deref() {
        Some(path) => {
            info!(path, "📥 Reading analysis batch");
            fs::read_to_string(path)?
        }
        None => {
            info!("📥 Reading analysis batch from stdin");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let request: AnalysisRequest = serde_json::from_str(&raw)
        .map_err(|e| AppError::DecodeError(format!("analysis batch is not valid JSON: {}", e)))?;

    let analyzer = TokenAnalyzer::new(settings.analysis_config()?);
    let response = analyzer.analyze_request(request)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
