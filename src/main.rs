//! distgrep CLI entry point

use anyhow::{Context, Result};
use distgrep::config::cli::{self, Command, RunArgs, ServeArgs};
use distgrep::config::{cli_convert, toml, validator};
use distgrep::{input, logging, output, query};

fn main() {
    let command = match cli::parse_command(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => e.exit(),
    };

    let code = match command {
        Command::Usage(code) => {
            eprint!("{}", cli::USAGE);
            code
        }
        Command::Serve(args) => run_serve(args),
        Command::Run(args) => run_query(args),
    };
    std::process::exit(code);
}

/// Run the node service until SIGINT/SIGTERM
fn run_serve(args: ServeArgs) -> i32 {
    logging::init(logging::SERVE_DEFAULT_FILTER);

    match serve(args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("server error: {:#}", e);
            1
        }
    }
}

fn serve(args: ServeArgs) -> Result<()> {
    let file = toml::load_optional(args.config.as_deref())?;
    let config = cli_convert::serve_config(&args, &file.serve);
    validator::validate_serve(&config).context("Configuration validation failed")?;

    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let service = distgrep::distributed::NodeService::new(config);
        service.run().await
    })
}

/// Run one query, locally or across peers
fn run_query(args: RunArgs) -> i32 {
    logging::init(logging::RUN_DEFAULT_FILTER);

    let config = match load_run_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return 2;
        }
    };

    let lines = match input::read_lines(config.file.as_deref()) {
        Ok(lines) => lines,
        Err(e) => {
            eprintln!("read error: {:#}", e);
            return 2;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return 2;
        }
    };

    match query::block_on_detached(runtime, query::execute(&config, lines)) {
        Ok(report) => match output::print_report(&report, config.json) {
            Ok(()) => 0,
            // Closed stdout (e.g. piped into `head`) is not a query failure.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => 0,
            Err(e) => {
                eprintln!("write error: {}", e);
                2
            }
        },
        Err(e) => {
            let prefix = if config.is_local() { "grep error" } else { "distributed error" };
            eprintln!("{}: {}", prefix, e);
            e.exit_code()
        }
    }
}

fn load_run_config(args: &RunArgs) -> Result<distgrep::RunConfig> {
    let file = toml::load_optional(args.config.as_deref())?;
    let config = cli_convert::run_config(args, &file.run)?;
    validator::validate_run(&config)?;
    Ok(config)
}
