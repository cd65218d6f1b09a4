mod demo;
mod render;
mod repl;
mod settings;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use depot_comm::Session;
use depot_comm::TcpTransport;
use depot_core::ClientState;
use depot_core::Config;
use depot_core::Endpoint;
use tracing_subscriber::EnvFilter;

use crate::repl::CheckInDefaults;
use crate::settings::Overrides;

#[derive(Parser)]
#[command(name = "depot", version)]
#[command(about = "Browse, check in and check out files on a remote repository server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: <config dir>/depot/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Port this client listens on for replies
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Server endpoint as host:port
    #[arg(long, global = true)]
    server: Option<Endpoint>,

    /// Remote repository root shown by every view
    #[arg(long, global = true)]
    root: Option<String>,

    /// Author recorded on check-ins
    #[arg(long, global = true, env = "DEPOT_AUTHOR", default_value = "anonymous")]
    author: String,

    /// Debug logging unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive shell over the four views (default)
    Shell,
    /// Replay the scripted check-in/check-out walkthrough
    Demo {
        /// Seconds without a reply before the demo stops waiting
        #[arg(long, default_value_t = 3)]
        wait: u64,

        /// Print the final client state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = Overrides {
        port: cli.port,
        server: cli.server.clone(),
        root: cli.root.clone(),
    };
    let config = settings::load(cli.config.as_deref(), &overrides)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let defaults = CheckInDefaults {
                author: cli.author,
                path: config.repository.local_files.display().to_string(),
                categories: String::new(),
            };
            let mut session = session(&config);
            let result = repl::run(&mut session, &config.repository.local_files, &defaults);
            session.shutdown();
            result
        }
        Commands::Demo { wait, json } => demo::run(
            session(&config),
            Duration::from_secs(wait),
            &config.repository.local_files,
            json,
        ),
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn session(config: &Config) -> Session<TcpTransport> {
    Session::new(TcpTransport::new(), ClientState::from_config(config))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
