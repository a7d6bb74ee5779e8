use clap::Parser;
use marketplace_e2e::cli::commands::{cmd_list, cmd_run, RunOptions};
use marketplace_e2e::cli::config::{load_config, Cli, Commands};
use marketplace_e2e::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Commands::Run {
            scenarios,
            format,
            output,
            trace,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let options = RunOptions::resolve(scenarios, format.clone(), output.clone(), trace.clone(), &config)?;
            let all_passed = cmd_run(&cli, &config, &options)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::List => cmd_list(),
    }

    Ok(())
}
