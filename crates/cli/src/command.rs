use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command as ClapCommand, builder::OsStringValueParser};
use tasks::Mode;

use crate::error::CliError;

pub(crate) const PROGRAM_NAME: &str = "pipekit";

const AFTER_HELP: &str = "\
Targets:
  build            clean the output directory, run every task, create links
  link             clean the output directory, symlink every task, create links
  clean            clean the output directory
  handle:<name>    run one task
  symlink:<name>   symlink one task
";

pub(crate) fn clap_command(program_name: &'static str) -> ClapCommand {
    ClapCommand::new(program_name)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run manifest-driven build tasks.")
        .after_help(AFTER_HELP)
        .arg(
            Arg::new("manifest")
                .long("manifest")
                .short('m')
                .value_name("FILE")
                .help("Read tasks from FILE instead of pipekit.json in the working directory.")
                .num_args(1)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("Resolve handlers for MODE: dev or prod.")
                .num_args(1)
                .default_value("dev"),
        )
        .arg(
            Arg::new("cwd")
                .long("cwd")
                .short('C')
                .value_name("DIR")
                .help("Resolve source and output directories against DIR.")
                .num_args(1)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .short('l')
                .help("List the targets the manifest defines and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase logging detail; repeat for more.")
                .action(ArgAction::Count)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log warnings and errors.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("targets")
                .value_name("TARGET")
                .help("Targets to run in order. Defaults to build.")
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Command line after parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ParsedArgs {
    pub(crate) manifest: Option<PathBuf>,
    pub(crate) mode: Mode,
    pub(crate) cwd: Option<PathBuf>,
    pub(crate) list: bool,
    pub(crate) verbosity: u8,
    pub(crate) quiet: bool,
    pub(crate) targets: Vec<String>,
}

/// Parse outcome: either arguments to act on, or a clap error that may be a
/// help or version request.
pub(crate) enum Parsed {
    Args(ParsedArgs),
    Clap(clap::Error),
    Invalid(CliError),
}

pub(crate) fn parse_args<I, S>(arguments: I) -> Parsed
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = match clap_command(PROGRAM_NAME).try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(error) => return Parsed::Clap(error),
    };

    let mode = match matches
        .remove_one::<String>("mode")
        .map_or(Ok(Mode::Development), |value| value.parse::<Mode>())
    {
        Ok(mode) => mode,
        Err(error) => return Parsed::Invalid(error.into()),
    };
    let targets: Vec<String> = matches
        .remove_many::<String>("targets")
        .map(Iterator::collect)
        .unwrap_or_default();

    Parsed::Args(ParsedArgs {
        manifest: matches.remove_one::<OsString>("manifest").map(PathBuf::from),
        mode,
        cwd: matches.remove_one::<OsString>("cwd").map(PathBuf::from),
        list: matches.get_flag("list"),
        verbosity: matches.get_count("verbose"),
        quiet: matches.get_flag("quiet"),
        targets,
    })
}
