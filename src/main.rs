mod app;
mod error;
mod logging;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use resolver::HostName;

use crate::app::Query;
use crate::error::AppError;

const VERSION: &str = concat!(
    env!("HOSTLOOKUP_VERSION"),
    " ",
    env!("HOSTLOOKUP_BUILD_HASH")
);

#[derive(Parser)]
#[command(
    name = "hostlookup",
    version = VERSION,
    about = "Looks up IP addresses and name servers on the internet"
)]
struct Arguments {
    #[command(subcommand)]
    command: Command,

    /// Config file to use instead of ~/.hostlookup.json
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Look up the IP addresses of a host
    Ip(LookupArgs),

    /// Look up the name servers of a host
    #[command(name = "servidores", visible_alias = "servers")]
    NameServers(LookupArgs),

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct LookupArgs {
    /// Host to look up [default: config "host", else mikemarciano.dev.br]
    #[arg(long)]
    host: Option<HostName>,

    /// Output format [default: config "format", else text]
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path
    Path,
    /// Write the default config file if it does not exist
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for config::Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => config::Format::Text,
            FormatArg::Json => config::Format::Json,
        }
    }
}

fn main() -> ExitCode {
    let arguments = Arguments::parse();
    logging::init(arguments.verbose);

    match run(arguments) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(arguments: Arguments) -> Result<(), AppError> {
    let config_path = arguments.config.as_deref();
    let mut out = io::stdout().lock();

    match arguments.command {
        Command::Ip(args) => app::run_lookup(
            Query::Ip,
            args.host,
            args.format.map(Into::into),
            config_path,
            &mut out,
        ),
        Command::NameServers(args) => app::run_lookup(
            Query::NameServers,
            args.host,
            args.format.map(Into::into),
            config_path,
            &mut out,
        ),
        Command::Config { action } => match action {
            ConfigAction::Path => app::print_config_path(config_path, &mut out),
            ConfigAction::Init => app::init_config(config_path, &mut out),
        },
    }
}
