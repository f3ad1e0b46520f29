//! Command-line surface generated from the merged option schema.

use std::path::{Path, PathBuf};

use buildcmd_core::{ArgValue, ArgumentSet, CommandSpec, MergedOptions, OptionSchema, OptionSpec};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short flags clap keeps for itself.
const RESERVED_SHORTS: &[char] = &['h'];

/// Options needed before the command tree can be built.
///
/// The platform list and the per-platform options depend on the config file
/// and the SDK root, so these are read from the raw argv first.
#[derive(Debug, Default, PartialEq)]
pub struct Bootstrap {
    pub config: Option<PathBuf>,
    pub sdk: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Bootstrap {
    /// Scans arguments (without the program name).
    pub fn scan(args: &[String]) -> Self {
        Self {
            config: scan_value(args, "config", None).map(PathBuf::from),
            sdk: scan_value(args, "sdk", Some('s')).map(PathBuf::from),
            log_level: scan_value(args, "log-level", Some('l')),
        }
    }
}

/// Last value given for `--long`, `--long=value`, `-s value` or `-svalue`.
fn scan_value(args: &[String], long: &str, short: Option<char>) -> Option<String> {
    let flag = format!("--{long}");
    let prefix = format!("--{long}=");
    let short = short.map(|c| format!("-{c}"));

    let mut found = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if *arg == flag || short.as_deref() == Some(arg.as_str()) {
            found = iter.next().cloned();
        } else if let Some(value) = arg.strip_prefix(&prefix) {
            found = Some(value.to_string());
        } else if let Some(value) = short
            .as_deref()
            .filter(|_| !arg.starts_with("--"))
            .and_then(|s| arg.strip_prefix(s))
            .filter(|v| !v.is_empty())
        {
            found = Some(value.to_string());
        }
    }
    found
}

/// Program name as typed, for copy-pasteable hints.
pub fn invocation_name(argv0: Option<&str>) -> String {
    argv0
        .and_then(|arg| Path::new(arg).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "buildcmd".to_string())
}

/// The top-level command with one subcommand per command spec.
pub fn build_cli(command: &CommandSpec, merged: &MergedOptions) -> Command {
    Command::new("buildcmd")
        .version(PACKAGE_VERSION)
        .about("Builds projects through the platform handlers of an installed SDK")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(subcommand(command, merged))
}

fn subcommand(spec: &CommandSpec, merged: &MergedOptions) -> Command {
    let mut cmd = Command::new(spec.name.clone());
    if let Some(desc) = &spec.description {
        cmd = cmd.about(desc.clone());
    }
    if let Some(long) = &spec.extended_description {
        cmd = cmd.long_about(long.clone());
    }

    for option in merged.surface() {
        let mut arg = option_arg(option);
        if !merged.base().contains(&option.key) {
            let owners: Vec<&str> = merged
                .variants()
                .filter(|v| merged.variant_layer(v).is_some_and(|l| l.contains(&option.key)))
                .collect();
            arg = arg.help_heading(format!("{} options", owners.join(", ")));
        }
        cmd = cmd.arg(arg);
    }
    cmd
}

/// Clap argument for one option.
///
/// Values are taken as plain strings; requiredness, allowed values and
/// defaults are enforced by the validator so it can prompt.
fn option_arg(option: &OptionSpec) -> Arg {
    let mut arg = Arg::new(option.key.clone()).long(option.key.clone());
    if let Some(abbr) = option.abbr.filter(|c| !RESERVED_SHORTS.contains(c)) {
        arg = arg.short(abbr);
    }

    let mut help = option.description.clone().unwrap_or_default();
    if let Some(values) = &option.values {
        help = format!("{help} [values: {}]", values.join(", "));
    }
    if let Some(default) = &option.default {
        help = format!("{help} [default: {default}]");
    }
    arg = arg.help(help.trim().to_string());

    if option.is_flag() {
        arg.action(ArgAction::SetTrue)
    } else {
        let hint = option.hint.clone().unwrap_or_else(|| option.key.clone());
        arg.action(ArgAction::Set).value_name(hint)
    }
}

/// Converts parsed matches into a raw argument set.
///
/// Only options given on the command line are included.
pub fn collect_args(matches: &ArgMatches, schema: &OptionSchema, invocation: &str) -> ArgumentSet {
    let mut args = ArgumentSet::new(invocation);
    for option in schema {
        if matches.value_source(&option.key) != Some(ValueSource::CommandLine) {
            continue;
        }
        if option.is_flag() {
            args.set(option.key.clone(), matches.get_flag(&option.key));
        } else if let Some(value) = matches.get_one::<String>(&option.key) {
            args.set(option.key.clone(), ArgValue::Text(value.clone()));
        }
    }
    args
}
