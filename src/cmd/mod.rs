//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`] or [`validate`]. Each handler lives in its
//! own submodule.

pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::RelayError;

pub async fn dispatch(cli: Cli) -> Result<(), RelayError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  callback-relay v{version}: signed payment-callback relay\n\n  \
         No command provided. To get started:\n\n    \
         callback-relay run                          Start with ./conf.properties\n    \
         callback-relay run -r router.json -k KEY    Start with flags\n    \
         callback-relay validate router.json         Check a routing file\n    \
         callback-relay --help                       See all commands and options\n"
    );
}
