use clap::Parser;
use hudl_login_e2e::cli::commands::{cmd_list, cmd_run};
use hudl_login_e2e::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Run(args) => {
            let all_passed = cmd_run(&args, &config)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::List(args) => cmd_list(&args, &config)?,
    }

    Ok(())
}

/// Log to stderr; RUST_LOG wins over the -v count.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hudl_login_e2e={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
