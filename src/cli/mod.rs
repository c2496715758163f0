//! The `venafi-ssh` command line tool.
//!
//! The tool stands in for the host platform: it creates the plugin from the
//! config, hands it a set of inputs and prints the outcome.

pub mod options;
pub mod report;

use crate::config::Config;
use crate::error::Error;
use crate::plugin::CredentialPlugin;
use self::options::Options;
use self::report::Report;


/// Loads the config, sets up logging and runs the command.
pub async fn run(options: Options) -> Result<Report, Error> {
    let config = Config::create(options.general.config.as_deref())?;
    config.init_logging()?;

    let plugin = CredentialPlugin::venafi_ssh(&config);
    options.command.run(&plugin).await
}
