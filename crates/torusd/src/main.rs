mod cli;
mod control;
mod paths;
mod pulse;
mod run;

use anyhow::Result;
use cli::{Command, ConfigAction};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Config(config_cmd)) => handle_config_command(config_cmd.action),
        None => run::run(cli.run),
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    let paths = AppPaths::discover()?;
    match action {
        ConfigAction::Check { path } => run::check_config(path.as_deref(), &paths),
        ConfigAction::Where => {
            run::print_paths(&paths);
            Ok(())
        }
    }
}
