mod app;
mod commands;
mod config;
mod errors;
mod gateway;
mod output;
mod panes;
mod tui;

use clap::{Parser, Subcommand};

use crate::app::Runtime;
use crate::commands::ask::AskArgs;
use crate::commands::auth::AuthCommand;
use crate::commands::config::ConfigCommand;
use crate::commands::dash::DashArgs;
use crate::errors::CliError;
use crate::output::{OutputMode, print_error};

#[derive(Debug, Parser)]
#[command(
    name = "panes",
    version,
    about = "Terminal dashboard for LLM completions: prompt, zoom, refine."
)]
struct Cli {
    #[arg(long = "api-url", global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, global = true)]
    quiet: bool,
    #[arg(long, global = true)]
    verbose: bool,
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive pane dashboard
    Dash(DashArgs),
    /// One-shot completion to stdout
    Ask(AskArgs),
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = OutputMode {
        json: cli.json,
        quiet: cli.quiet,
        verbose: cli.verbose,
        debug: cli.debug,
    };

    let result = run(cli, output.clone()).await;
    if let Err(err) = result {
        print_error(&err, &output);
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli, output: OutputMode) -> Result<(), CliError> {
    let config = config::load_config()?;
    let config_path = config::config_path()?;

    let mut runtime = Runtime {
        output,
        config,
        config_path,
        api_url_override: cli.api_url,
    };

    match cli.command {
        Commands::Dash(args) => commands::dash::handle(&runtime, args).await,
        Commands::Ask(args) => commands::ask::handle(&runtime, args).await,
        Commands::Config { command } => commands::config::handle(&mut runtime, command).await,
        Commands::Auth { command } => commands::auth::handle(&mut runtime, command).await,
    }
}
