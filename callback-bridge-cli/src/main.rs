//! Callback Bridge CLI Application
//!
//! This is the command-line front end for the callback-bridge library.
//! It adds:
//! - A showcase of the library's integer and statistics helpers
//! - An interactive listener that feeds stdin into a registered callback
//! - Built-in callbacks (24 points solver, echo) and native callbacks
//!   loaded from a dynamic library
//! - TOML configuration with command line overrides

use anyhow::Result;
use callback_bridge::{BridgeModule, HostValue, ParsePolicy};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::path::PathBuf;

mod callbacks;
mod config;
mod demo;
mod native;
mod solver;

use config::{default_native_function, default_target, AppConfig, CallbackConfig};

/// Callback Bridge - Dispatch parsed input lines into a registered callback
#[derive(Parser, Debug)]
#[command(name = "callback-bridge-cli")]
#[command(about = "Register a callback and drive it from line input", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the utility showcase
    Demo {
        /// Extra arguments, echoed back by the showcase
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Listen on stdin and invoke the callback for every complete input
    Listen(ListenArgs),
}

#[derive(clap::Args, Debug, Default)]
struct ListenArgs {
    /// Callback to register (overrides the config file)
    #[arg(long, value_enum)]
    callback: Option<CallbackKind>,

    /// Dynamic library holding a native callback (implies --callback native)
    #[arg(long, value_name = "FILE")]
    library: Option<PathBuf>,

    /// Exported function name of the native callback
    #[arg(long, value_name = "NAME")]
    function: Option<String>,

    /// Target value for the solver callback
    #[arg(long)]
    target: Option<i64>,

    /// Number of integers per input line
    #[arg(long)]
    arity: Option<usize>,

    /// Line that stops the listener
    #[arg(long, value_name = "TEXT")]
    quit_command: Option<String>,

    /// Reject lines containing any non-integer token
    #[arg(long)]
    strict: bool,

    /// Print the run summary as JSON when the listener stops
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CallbackKind {
    Solver,
    Echo,
    Native,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Callback Bridge CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using bridge library v{}", callback_bridge::VERSION);

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    match args.command {
        Some(Command::Demo { args: extra }) => {
            let stdout = std::io::stdout();
            demo::run_demo(&mut stdout.lock(), "Callback Bridge Demo", &extra)?;
        }
        Some(Command::Listen(listen)) => {
            let app_config = apply_overrides(app_config, &listen)?;
            listen_mode(app_config)?;
        }
        None => {
            // No command - show help
            println!("Callback Bridge - No command specified");
            println!("\nQuick Start:");
            println!("  callback-bridge-cli demo");
            println!("  callback-bridge-cli listen");
            println!("  callback-bridge-cli listen --callback echo --arity 3");
            println!("\nWith a configuration file:");
            println!("  callback-bridge-cli --config config.toml listen");
            println!("\nUse --help for more options");
        }
    }

    Ok(())
}

/// Merge command line flags into the loaded configuration
fn apply_overrides(mut config: AppConfig, listen: &ListenArgs) -> Result<AppConfig> {
    if let Some(arity) = listen.arity {
        config.bridge.arity = arity;
    }
    if let Some(quit) = &listen.quit_command {
        config.bridge.quit_command = quit.clone();
    }
    if listen.strict {
        config.bridge.parse_policy = ParsePolicy::Strict;
    }
    if listen.json {
        config.output.json_summary = true;
    }

    let kind = match (listen.callback, &listen.library) {
        (None, Some(_)) => Some(CallbackKind::Native),
        (kind, _) => kind,
    };

    config.callback = match kind {
        None => config.callback,
        Some(CallbackKind::Echo) => CallbackConfig::Echo,
        Some(CallbackKind::Solver) => CallbackConfig::Solver {
            target: default_target(),
        },
        Some(CallbackKind::Native) => {
            let (library, function) = match &config.callback {
                CallbackConfig::Native { library, function } => {
                    (Some(library.clone()), function.clone())
                }
                _ => (None, default_native_function()),
            };
            let library = listen.library.clone().or(library).ok_or_else(|| {
                anyhow::anyhow!("--callback native requires --library or [callback] library")
            })?;
            CallbackConfig::Native { library, function }
        }
    };

    if let CallbackConfig::Native { function, .. } = &mut config.callback {
        if let Some(name) = &listen.function {
            *function = name.clone();
        }
    }
    if let CallbackConfig::Solver { target } = &mut config.callback {
        if let Some(t) = listen.target {
            *target = t;
        }
    }

    config.validate()?;
    Ok(config)
}

/// Listen mode - register the configured callback and read stdin until quit
fn listen_mode(config: AppConfig) -> Result<()> {
    println!("═══════════════════════════════════════════════");
    println!("  Callback Bridge - Listener");
    println!("═══════════════════════════════════════════════\n");

    let callback = callbacks::build_callback(&config.callback)?;
    log::debug!("Callback configuration: {:?}", config.callback);

    let mut module = BridgeModule::init(config.bridge.clone());
    let greeting = module.call("sayHello", &[])?;
    println!("{}", greeting);

    module.call("registerCallback", &[HostValue::Function(callback)])?;
    println!(
        "Enter {} integers per line, '{}' to stop",
        config.bridge.arity, config.bridge.quit_command
    );

    module.call("startInput", &[])?;

    if let Some(summary) = module.last_summary() {
        if config.output.json_summary {
            println!("{}", serde_json::to_string_pretty(summary)?);
        } else {
            println!(
                "\n{} lines, {} invocations, {} rejected",
                summary.lines_received,
                summary.invocations,
                summary.rejected()
            );
        }
    }

    let stats = module.shutdown();
    log::debug!("Bridge stats: {:?}", stats);

    Ok(())
}

/// Map the -v/-q flags to a log level
fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initialize logging on stderr, keeping stdout for prompts and results
///
/// `RUST_LOG` directives, when set, refine the level picked by the flags.
fn init_logging(verbose: u8, quiet: bool) {
    use std::io::Write;

    let mut builder = Builder::new();
    builder
        .filter_level(log_level(verbose, quiet))
        .target(Target::Stderr);
    if let Ok(directives) = std::env::var("RUST_LOG") {
        builder.parse_filters(&directives);
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{:<5} {}] {}",
                record.level(),
                record.module_path().unwrap_or_else(|| record.target()),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_listen() {
        let args = Args::parse_from([
            "callback-bridge-cli",
            "-v",
            "listen",
            "--callback",
            "echo",
            "--arity",
            "3",
            "--strict",
        ]);
        assert_eq!(args.verbose, 1);
        match args.command {
            Some(Command::Listen(listen)) => {
                assert_eq!(listen.callback, Some(CallbackKind::Echo));
                assert_eq!(listen.arity, Some(3));
                assert!(listen.strict);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_args_parse_demo_trailing() {
        let args = Args::parse_from(["callback-bridge-cli", "demo", "a", "--b"]);
        match args.command {
            Some(Command::Demo { args }) => assert_eq!(args, vec!["a", "--b"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let listen = ListenArgs {
            arity: Some(2),
            quit_command: Some("exit".to_string()),
            strict: true,
            json: true,
            target: Some(10),
            ..Default::default()
        };
        let config = apply_overrides(AppConfig::default(), &listen).unwrap();
        assert_eq!(config.bridge.arity, 2);
        assert_eq!(config.bridge.quit_command, "exit");
        assert_eq!(config.bridge.parse_policy, ParsePolicy::Strict);
        assert!(config.output.json_summary);
        assert_eq!(config.callback, CallbackConfig::Solver { target: 10 });
    }

    #[test]
    fn test_library_implies_native() {
        let listen = ListenArgs {
            library: Some(PathBuf::from("libcb.so")),
            function: Some("handle".to_string()),
            ..Default::default()
        };
        let config = apply_overrides(AppConfig::default(), &listen).unwrap();
        assert_eq!(
            config.callback,
            CallbackConfig::Native {
                library: PathBuf::from("libcb.so"),
                function: "handle".to_string(),
            }
        );
    }

    #[test]
    fn test_native_without_library_fails() {
        let listen = ListenArgs {
            callback: Some(CallbackKind::Native),
            ..Default::default()
        };
        assert!(apply_overrides(AppConfig::default(), &listen).is_err());
        let zero = ListenArgs {
            arity: Some(0),
            ..Default::default()
        };
        assert!(apply_overrides(AppConfig::default(), &zero).is_err());
    }

    #[test]
    fn test_solver_arity_limit() {
        let wide = ListenArgs {
            arity: Some(7),
            ..Default::default()
        };
        let err = apply_overrides(AppConfig::default(), &wide).unwrap_err();
        assert!(err.to_string().contains("too large for the solver"));

        let echo = ListenArgs {
            arity: Some(7),
            callback: Some(CallbackKind::Echo),
            ..Default::default()
        };
        assert_eq!(apply_overrides(AppConfig::default(), &echo).unwrap().bridge.arity, 7);
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0, false), LevelFilter::Info);
        assert_eq!(log_level(1, false), LevelFilter::Debug);
        assert_eq!(log_level(3, false), LevelFilter::Trace);
        assert_eq!(log_level(2, true), LevelFilter::Error);
    }
}
