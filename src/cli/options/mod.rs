//! The options for the `venafi-ssh` command.

//------------ Sub-modules ---------------------------------------------------

pub mod args;


//------------ Content -------------------------------------------------------

use std::{fmt, path::PathBuf};

use clap::Parser;

use crate::issuer::Inputs;
use crate::plugin::CredentialPlugin;
use crate::tpp::TppConnector;
use crate::error::Error;
use super::report::{Report, ReportFormat};
use self::args::JsonFile;


//------------ Options -------------------------------------------------------

/// The command line options for the plugin host stand-in.
#[derive(clap::Parser)]
#[command(
    version,
    about = "Issues SSH certificates through the Venafi Trust Protection \
             Platform the way a credential host runs the plugin.",
)]
pub struct Options {
    #[command(flatten)]
    pub general: GeneralOptions,

    #[command(subcommand)]
    pub command: Command,
}

impl Options {
    /// Creates the options from the process arguments.
    ///
    /// If the arguments won’t result in usable options, exits the process.
    pub fn from_args() -> Self {
        Self::parse()
    }
}


//------------ GeneralOptions ------------------------------------------------

/// The options common to all commands.
#[derive(clap::Args)]
pub struct GeneralOptions {
    /// Path to the config file (default: '/etc/venafi-ssh.conf' if present)
    #[arg(
        short, long,
        env = "VENAFI_SSH_CONFIG",
        value_name = "path"
    )]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(
        short, long,
        env = "VENAFI_SSH_FORMAT",
        default_value = "text",
    )]
    pub format: ReportFormat,
}


//------------ Command -------------------------------------------------------

#[derive(clap::Subcommand)]
pub enum Command {
    /// Show the plugin name and the inputs it expects.
    Schema(Schema),

    /// Issue an SSH certificate for the given inputs.
    Issue(Issue),
}

impl Command {
    pub async fn run(self, plugin: &CredentialPlugin<TppConnector>) -> Result<Report, Error> {
        match self {
            Command::Schema(cmd) => Ok(cmd.run(plugin)),
            Command::Issue(cmd) => cmd.run(plugin).await,
        }
    }
}


//------------ Schema --------------------------------------------------------

#[derive(clap::Args)]
pub struct Schema;

impl Schema {
    pub fn run(self, plugin: &CredentialPlugin<TppConnector>) -> Report {
        Report::schema(plugin.describe())
    }
}


//------------ Issue ---------------------------------------------------------

#[derive(clap::Args)]
pub struct Issue {
    /// Path to a JSON object with the merged field and metadata values
    #[arg(long, short, value_name = "path")]
    inputs: JsonFile<Inputs, InputsMsg>,
}

impl Issue {
    pub async fn run(self, plugin: &CredentialPlugin<TppConnector>) -> Result<Report, Error> {
        match plugin.run(&self.inputs.content).await? {
            Some(cert) => Ok(Report::Certificate(cert)),
            None => Ok(Report::NoCertificate),
        }
    }
}

#[derive(Clone, Copy, Default, Debug)]
struct InputsMsg;

impl fmt::Display for InputsMsg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("inputs")
    }
}


//------------ Tests ---------------------------------------------------------
