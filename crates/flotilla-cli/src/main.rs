//! Flotilla CLI - declarative Helm-release orchestration

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;

mod commands;
mod exit_codes;
mod loader;

#[derive(Parser)]
#[command(name = "flotilla")]
#[command(author = "Flotilla Contributors")]
#[command(version)]
#[command(about = "Declarative Helm-release orchestration", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a desired state file and resolve the run's targets
    Validate {
        /// Desired state file (.yaml, .yml or .toml)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Limit the run to releases in these groups (repeatable)
        #[arg(long = "group")]
        groups: Vec<String>,

        /// Limit the run to these releases (repeatable)
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Override all namespaces with this one
        #[arg(long)]
        ns_override: Option<String>,

        /// Kubeconfig supplying an ambient cluster context
        #[arg(long, env = "KUBECONFIG")]
        kubeconfig: Option<PathBuf>,

        /// Also check that referenced charts exist in their repositories
        #[arg(long)]
        check_charts: bool,
    },

    /// Print a desired state file
    Show {
        /// Desired state file (.yaml, .yml or .toml)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::Validate {
            file,
            groups,
            targets,
            ns_override,
            kubeconfig,
            check_charts,
        } => {
            commands::validate::run(
                &file,
                &groups,
                &targets,
                ns_override,
                kubeconfig,
                check_charts,
            )
            .await
        }

        Commands::Show { file } => commands::show::run(&file),
    }
}

fn init_tracing(debug: bool) {
    let default_directive = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
