mod changes;
mod cli;
mod commit;
mod constants;
mod context;
mod forms;
mod git;
mod session;
mod ui;

use crate::cli::Cli;
use crate::git::GitCli;
use crate::session::Session;
use crate::ui::Console;
use anyhow::{Result, bail};
use std::io::IsTerminal;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

/// returns whether the session finished without a git failure
fn run() -> Result<bool> {
    let cli = Cli::parse_args();
    ui::set_verbose(cli.verbose);

    // sanity checks
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        bail!("interactive terminal required");
    }
    let git = GitCli::new(".", cli.remote);
    git.ensure_repository()?;

    // main
    let mut console = Console::new();
    let state = Session::new(&git, &mut console).run()?;

    if state.failed {
        error!("stopped after a git failure");
    } else if state.has_commits() {
        status!(
            "done: {} commit{} on {}",
            state.commits.len(),
            if state.commits.len() == 1 { "" } else { "s" },
            state.branch
        );
    }
    Ok(!state.failed)
}
