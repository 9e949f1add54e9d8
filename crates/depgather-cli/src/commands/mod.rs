//! Command dispatch and handler modules.

mod range;
mod resolve;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Range { action } => range::exec(action),
        Command::Resolve {
            packages,
            framework,
            prerelease,
            feed,
            config,
            range_filter,
            json,
        } => {
            let opts = resolve::ResolveOptions {
                packages,
                framework,
                prerelease,
                feed,
                config,
                range_filter,
                json,
            };
            resolve::exec(&opts).await
        }
    }
}
