mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, expand, scan};
use sweepr_common::config::Config;
use sweepr_common::network::target::{self, TargetSet};
use terminal::input::read_targets;
use terminal::{logging, print, spinner};
use tracing::error;

use crate::commands::TargetArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);

    let cfg = Config {
        no_banner: commands.no_banner,
        quiet: commands.quiet,
        disable_input: commands.no_input,
    };
    print::banner(cfg.no_banner, cfg.quiet);

    match run(commands.command, &cfg).await {
        Ok(code) => code,
        Err(e) => {
            spinner::clear();
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, cfg: &Config) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Scan { targets, options } => {
            let targets = load_targets(&targets)?;
            scan::scan(targets, options.to_scan_config(), cfg).await
        }
        Commands::Expand { targets } => {
            let targets = load_targets(&targets)?;
            expand::expand(&targets, cfg);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_targets(args: &TargetArgs) -> anyhow::Result<TargetSet> {
    let raw: String = read_targets(&args.targets, args.input.as_deref())?;
    Ok(target::expand(&raw)?)
}
