//! courier CLI - manifest-driven file sync and release over SSH
//!
//! Usage: courier <COMMAND>
//!
//! Commands:
//!   push    Copy local files to the remote host
//!   pull    Copy remote files to the local machine
//!   deploy  Update, restart and health-check the remote service
//!   check   Validate the manifest

use std::process::ExitCode;

use clap::Parser;

use courier::infrastructure::logging;
use courier::presentation::output::render_error_json;
use courier::presentation::Cli;

mod commands;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match commands::dispatch(&cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            if cli.json {
                println!(
                    "{}",
                    render_error_json(commands::error_kind(&err), &format!("{:#}", err))
                );
            }
            eprintln!("Error: {:#}", err);
            ExitCode::from(commands::error_exit_code(&err))
        }
    }
}
