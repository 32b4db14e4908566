//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`init`].

pub mod init;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::RelaycastError;

pub async fn dispatch(cli: Cli) -> Result<(), RelaycastError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Init(ref args)) => init::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  relaycast v{version} - fire-and-forget GET broadcast proxy\n\n  \
         No command provided. To get started:\n\n    \
         relaycast init                    Generate ./application.properties\n    \
         relaycast run                     Start the proxy (auto-detects config)\n    \
         relaycast validate <file>         Check a config file\n    \
         relaycast --help                  See all commands and options\n"
    );
}
