pub mod cli;
pub mod core;
pub mod providers;
pub mod tool;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

pub use crate::core::{ConversionRequest, ConversionResult, ToolResponse};
pub use crate::tool::{ConversionExecutor, ToolDescriptor};

pub enum AppCommand {
    Convert {
        amount: f64,
        from: String,
        to: Vec<String>,
        json: bool,
    },
    Invoke {
        args: Option<String>,
    },
    Schema,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxtool starting...");

    if let AppCommand::Schema = command {
        return cli::invoke::schema();
    }

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let executor = ConversionExecutor::from_config(&config)?;

    match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            json,
        } => cli::convert::run(&executor, amount, &from, &to, json).await,
        AppCommand::Invoke { args } => cli::invoke::run(&executor, args.as_deref()).await,
        AppCommand::Schema => unreachable!("Schema command is handled before config is loaded"),
    }
}
