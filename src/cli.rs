use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(name = "chrisstoreclient", version, about = "ChRIS store CLI")]
pub struct Cli {
    #[arg(help = "Store API URL, e.g. http://localhost:8010/api/v1/")]
    pub storeurl: String,
    #[arg(short, long, global = true, help = "Store username")]
    pub username: Option<String>,
    #[arg(short, long, global = true, help = "Store password")]
    pub password: Option<String>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Request timeout in seconds"
    )]
    pub timeout: u64,
    #[arg(
        short = 'd',
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-d info, -dd debug, -ddd trace)"
    )]
    pub debug: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    List {
        #[arg(help = "Search filters of the form key==value")]
        queryparameters: Vec<String>,
        #[arg(
            short,
            long,
            help = "Print every plugin attribute and the plugin's parameter list"
        )]
        verbose: bool,
    },
    Add {
        name: String,
        dockerimage: String,
        descriptorfile: PathBuf,
        publicrepo: String,
    },
    Modify {
        name: String,
        dockerimage: String,
        descriptorfile: PathBuf,
        publicrepo: String,
        #[arg(long, help = "Rename the plugin (omitted: name stays unchanged)")]
        newname: Option<String>,
    },
    Remove {
        name: String,
    },
}
