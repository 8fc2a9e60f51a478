//! Kinfolk CLI - record family relationships from the command line.

use clap::Parser;
use kinfolk_cli::commands;
use kinfolk_cli::{Cli, Command, Config, Context, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so table and JSON output stay clean on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("KINFOLK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run() -> kinfolk_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);
    let ctx = Context::new(config, config_path, cli.db);
    tracing::debug!(db = %ctx.db_path.display(), "using database");

    match cli.command {
        Command::Init(args) => commands::execute_init(args, &ctx, &formatter),
        Command::Person(args) => commands::execute_person(args, &ctx, &formatter),
        Command::Relate(args) => commands::execute_relate(args, &ctx, &formatter),
        Command::Request(args) => commands::execute_request(args, &ctx, &formatter),
        Command::Accept(args) => commands::execute_accept(args, &ctx, &formatter),
        Command::Reject(args) => commands::execute_reject(args, &ctx, &formatter),
        Command::Edges(args) => commands::execute_edges(args, &ctx, &formatter),
        Command::Suggest(args) => commands::execute_suggest(args, &ctx, &formatter),
        Command::Unrelate(args) => commands::execute_unrelate(args, &ctx, &formatter),
        Command::Codes => commands::execute_codes(&ctx, &formatter),
    }
}
