use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxtool::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxtool::AppCommand {
    fn from(cmd: Commands) -> fxtool::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                json,
            } => fxtool::AppCommand::Convert {
                amount,
                from,
                to,
                json,
            },
            Commands::Invoke { args } => fxtool::AppCommand::Invoke { args },
            Commands::Schema => fxtool::AppCommand::Schema,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount into one or more currencies
    Convert {
        /// Amount to convert
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        /// Currency to convert from
        from: String,
        /// Currencies to convert to
        #[arg(required = true)]
        to: Vec<String>,
        /// Print raw tool responses instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Run the tool with a JSON argument object, as an agent framework would
    Invoke {
        /// Arguments as JSON; read from stdin when omitted
        #[arg(long)]
        args: Option<String>,
    },
    /// Print the tool registration schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxtool::cli::setup::setup(),
        Some(cmd) => fxtool::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
