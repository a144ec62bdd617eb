use std::io::IsTerminal;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::{run_local, run_orchestrator, run_runner};
use crate::args::{Cli, Command, OrchestratorArgs};
use crate::config::{apply_config, load_config};
use crate::error::AppResult;

const ORCHESTRATOR_SUBCOMMAND: &str = "orchestrator";

pub(crate) fn run() -> AppResult<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    crate::logger::init_logging(cli.verbose, std::io::stdout().is_terminal());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(cli.command, &matches))
}

async fn run_async(command: Command, matches: &ArgMatches) -> AppResult<()> {
    match command {
        Command::Orchestrator(args) => {
            let args = with_config(args, matches)?;
            run_orchestrator(args).await
        }
        Command::Runner(args) => run_runner(args).await,
        Command::Local(args) => run_local(args).await,
    }
}

fn with_config(mut args: OrchestratorArgs, matches: &ArgMatches) -> AppResult<OrchestratorArgs> {
    let Some(config) = load_config(args.config.as_deref())? else {
        return Ok(args);
    };
    if let Some(sub_matches) = matches.subcommand_matches(ORCHESTRATOR_SUBCOMMAND) {
        apply_config(&mut args, sub_matches, &config)?;
    }
    Ok(args)
}
