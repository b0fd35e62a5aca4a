use std::env;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use logging::VerbosityConfig;
use tasks::{BuildTool, Mode, Runner, ToolConfig};

use crate::command::{Parsed, ParsedArgs, parse_args};
use crate::error::CliError;
use crate::manifest::{DEFAULT_MANIFEST, Manifest};

/// Highest exit status the front-end reports.
pub const MAX_EXIT_CODE: i32 = 2;

const DEFAULT_TARGET: &str = "build";

/// Runs the command line and returns the process exit status.
///
/// `0` means every target succeeded. `1` means a target failed or the
/// manifest could not be used; task failures are reported through the log,
/// everything else on `stderr`. `2` means the arguments were rejected.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let parsed = match parse_args(arguments) {
        Parsed::Args(parsed) => parsed,
        Parsed::Clap(error) => return report_clap_error(&error, stdout, stderr),
        Parsed::Invalid(error) => {
            let _ = writeln!(stderr, "pipekit: {error}");
            return MAX_EXIT_CODE;
        }
    };

    match execute(parsed, stdout) {
        Ok(status) => status,
        Err(error) => {
            let _ = writeln!(stderr, "pipekit: {error}");
            1
        }
    }
}

/// Converts a status returned by [`run`] into an [`ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    ExitCode::from(u8::try_from(clamped).unwrap_or(1))
}

fn report_clap_error<Out, Err>(error: &clap::Error, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            if write!(stdout, "{error}").is_err() {
                return 1;
            }
            0
        }
        _ => {
            let _ = write!(stderr, "{error}");
            MAX_EXIT_CODE
        }
    }
}

fn execute<Out>(parsed: ParsedArgs, stdout: &mut Out) -> Result<i32, CliError>
where
    Out: Write,
{
    let cwd = resolve_cwd(parsed.cwd.as_deref())?;
    let manifest_path = match &parsed.manifest {
        Some(path) => cwd.join(path),
        None => cwd.join(DEFAULT_MANIFEST),
    };
    let manifest = Manifest::load(&manifest_path)?;
    let config = manifest.tool_config(&cwd)?;

    if parsed.list {
        for target in available_targets(&config, parsed.mode) {
            if writeln!(stdout, "{target}").is_err() {
                return Ok(1);
            }
        }
        return Ok(0);
    }

    let verbosity = if parsed.quiet {
        VerbosityConfig::quiet()
    } else {
        VerbosityConfig::from_verbose_level(parsed.verbosity)
    };
    let mut runner = Runner::new().with_verbosity(verbosity);
    let plan = Plan::register(&mut runner, &manifest, config, parsed.mode);

    let targets = if parsed.targets.is_empty() {
        vec![DEFAULT_TARGET.to_owned()]
    } else {
        parsed.targets
    };
    for target in &targets {
        plan.define(&mut runner, target)?;
    }
    for target in &targets {
        if runner.run(target).is_err() {
            return Ok(1);
        }
    }
    Ok(0)
}

fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf, CliError> {
    match cwd {
        Some(cwd) if cwd.is_absolute() => Ok(cwd.to_path_buf()),
        Some(cwd) => Ok(env::current_dir().map_err(CliError::CurrentDir)?.join(cwd)),
        None => env::current_dir().map_err(CliError::CurrentDir),
    }
}

/// Task names registered for one run, and the series targets expand to.
struct Plan {
    init: String,
    active: Vec<String>,
    known: Vec<String>,
    has_links: bool,
}

impl Plan {
    fn register(runner: &mut Runner, manifest: &Manifest, config: ToolConfig, mode: Mode) -> Self {
        let known: Vec<String> = config.tasks().iter().map(|info| info.name().to_owned()).collect();
        let active: Vec<String> = config
            .tasks()
            .iter()
            .filter(|info| info.handler(mode).is_some())
            .map(|info| info.name().to_owned())
            .collect();

        let tool = BuildTool::new(config);
        let init = tool.init(mode, None);
        let plan = Self {
            init: init.name().to_owned(),
            active,
            known,
            has_links: !manifest.links.is_empty(),
        };

        runner
            .task(init)
            .task(tool.clean_dist_task())
            .task(tool.links_task(manifest.link_specs()));
        for name in &plan.known {
            let dist = manifest.task(name).and_then(|entry| entry.dist.clone());
            runner
                .task(tool.handle_task(name, dist.clone()))
                .task(tool.symlink_task(name, dist));
        }
        plan
    }

    /// Registers `target` as a series on `runner`.
    fn define(&self, runner: &mut Runner, target: &str) -> Result<(), CliError> {
        let mut members = vec![self.init.clone()];
        match target.split_once(':') {
            None if target == "clean" => members.push("cleanDist".to_owned()),
            None if target == "build" || target == "link" => {
                let prefix = if target == "build" { "handle_" } else { "symlink_" };
                members.push("cleanDist".to_owned());
                members.extend(self.active.iter().map(|name| format!("{prefix}{name}")));
                if self.has_links {
                    members.push("links".to_owned());
                }
            }
            Some((kind @ ("handle" | "symlink"), name)) if self.known.iter().any(|known| known == name) => {
                members.push(format!("{kind}_{name}"));
            }
            _ => return Err(CliError::UnknownTarget(target.to_owned())),
        }
        runner.series(target, members);
        Ok(())
    }
}

fn available_targets(config: &ToolConfig, mode: Mode) -> Vec<String> {
    let mut targets = vec!["build".to_owned(), "link".to_owned(), "clean".to_owned()];
    for info in config.tasks() {
        if info.handler(mode).is_some() {
            targets.push(format!("handle:{}", info.name()));
            targets.push(format!("symlink:{}", info.name()));
        }
    }
    targets
}
