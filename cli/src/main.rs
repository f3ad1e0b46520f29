mod args;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use buildcmd_runtime::{
    BUILD_COMMAND, BackendRegistry, BuildConfig, CommandLifecycle, ConsoleLogger,
    LifecycleContext, LifecycleError, RealFs, StdioLineReader, build_command, common_options,
};
use tracing_subscriber::EnvFilter;

use crate::args::{Bootstrap, build_cli, collect_args, invocation_name};

/// Why the CLI stopped.
enum Failure {
    /// Already printed by the lifecycle's logger.
    Reported,
    Message(String),
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Message(message)
    }
}

impl From<LifecycleError> for Failure {
    fn from(err: LifecycleError) -> Self {
        if err.is_reported() {
            Failure::Reported
        } else {
            Failure::Message(err.to_string())
        }
    }
}

fn main() {
    let argv: Vec<String> = std::env::args().collect();

    match run(&argv) {
        Ok(()) => {}
        Err(Failure::Reported) => std::process::exit(1),
        Err(Failure::Message(err)) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(argv: &[String]) -> Result<(), Failure> {
    let boot = Bootstrap::scan(argv.get(1..).unwrap_or_default());
    let config = BuildConfig::discover(boot.config.as_deref())
        .map_err(|err| format!("failed to load config: {err}"))?;
    init_tracing(boot.log_level.as_deref(), config.cli.log_level.as_deref());

    let sdk_root = boot
        .sdk
        .clone()
        .or_else(|| config.sdk.root.clone())
        .unwrap_or_else(bundled_sdk_root);
    let cwd = std::env::current_dir()
        .map_err(|err| format!("failed to read current directory: {err}"))?;
    tracing::debug!(sdk_root = %sdk_root.display(), platforms = ?config.platforms, "starting");

    let registry = BackendRegistry::with_executables(&config.platforms, &sdk_root);
    let ctx = LifecycleContext {
        registry: &registry,
        probe: &RealFs,
        logger: &ConsoleLogger,
        config: &config,
        sdk_root,
        cwd,
    };
    let mut lifecycle = CommandLifecycle::new(build_command(&config), common_options(), ctx);
    let merged = lifecycle.configure()?.clone();

    let matches = build_cli(lifecycle.command(), &merged).get_matches_from(argv);
    let Some((BUILD_COMMAND, sub)) = matches.subcommand() else {
        return Err(Failure::Message("unknown command".to_string()));
    };

    let invocation = invocation_name(argv.first().map(String::as_str));
    let raw = collect_args(sub, merged.surface(), &invocation);
    let interactive = config.cli.prompt && !raw.is_set("no-prompt") && std::io::stdin().is_terminal();

    lifecycle.execute(raw, interactive, &mut StdioLineReader)?;
    Ok(())
}

/// `--log-level`, then `RUST_LOG`, then the config file, then `warn`.
fn init_tracing(flag: Option<&str>, configured: Option<&str>) {
    let filter = match flag {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or("warn"))),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// The SDK this binary was installed with: the parent of its directory.
fn bundled_sdk_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
