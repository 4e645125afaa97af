use std::sync::Arc;

use anyhow::{Context, Result};
use nutri_gateway::cli::{parse_args, Command};
use nutri_gateway::config::AppConfig;
use nutri_gateway::gateway::CompletionGateway;
use nutri_gateway::logging::{self, LogFormat};
use nutri_gateway::meal_analyzer::MealAnalyzer;
use nutri_gateway::nutrition_summary::MealReport;
use nutri_gateway::server::{self, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = parse_args();
    logging::init(&cli.log_level, LogFormat::from_env())?;

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let gateway = Arc::new(
        CompletionGateway::new(&config.gateway).context("Failed to initialize completion gateway")?,
    );

    match cli.command {
        Command::Serve { bind } => {
            let bind_addr = bind.unwrap_or(config.bind_addr);
            server::serve(AppState::new(gateway), bind_addr).await
        }
        Command::Analyze(args) => {
            let description = args.read_description().await?;
            info!("analyzing meal description");
            let analyzer = MealAnalyzer::new(gateway);
            let ingredients = analyzer
                .analyze(&description)
                .await
                .context("Meal analysis failed")?;

            let report = MealReport::new(&description, ingredients);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}
