//! Implements the command-line interface for `comptree`.

use clap::Parser;

use crate::args::CommandLineArgs;
use crate::commands::{self, Context};
use crate::config;
use crate::error::Error;
use crate::error_formatter;
use crate::events;
use crate::productinfo;

/// Main entry point for `comptree`.
pub fn run() {
    //
    // Install panic handler.
    //
    install_panic_handlers();

    //
    // Parse args.
    //
    let parsed_args = match CommandLineArgs::try_parse() {
        Ok(parsed_args) => parsed_args,
        Err(e) => {
            let _ = e.print();

            // Check for whether this is something we'd truly consider fatal. clap returns
            // errors for `--help`, `--version`, etc.
            let exit_code = match e.kind() {
                clap::error::ErrorKind::DisplayVersion => 0,
                clap::error::ErrorKind::DisplayHelp => 0,
                _ => 1,
            };

            std::process::exit(exit_code);
        }
    };

    //
    // Run.
    //
    let exit_code = run_with_args(&parsed_args);

    std::process::exit(i32::from(exit_code));
}

/// Installs a panic handler that, on release builds, captures panic details to a
/// temporary .toml file and reports a human-readable message to the screen.
fn install_panic_handlers() {
    human_panic::setup_panic!(
        human_panic::Metadata::new(productinfo::PRODUCT_NAME, productinfo::PRODUCT_VERSION)
            .homepage(productinfo::PRODUCT_DISPLAY_URI)
            .support("please file an issue in the comptree repository")
    );
}

/// Runs `comptree` with already-parsed arguments. Returns the exit code.
///
/// # Arguments
///
/// * `args` - The parsed command-line arguments.
#[doc(hidden)]
fn run_with_args(args: &CommandLineArgs) -> u8 {
    // Initialize tracing.
    let mut event_config = events::TraceEventConfig::init(&args.enabled_debug_events);

    let formatter = error_formatter::Formatter {
        use_color: !args.disable_color,
    };

    let result = load_settings(args, &mut event_config).and_then(|config| {
        let context = Context { config, formatter: formatter.clone() };
        commands::run(&args.command, &context)
    });

    // Display any error that percolated up.
    match result {
        Ok(code) => code,
        Err(err) => {
            eprint!("{}", formatter.format_error(&err));
            1
        }
    }
}

/// Loads the user settings file and applies its logging settings.
fn load_settings(
    args: &CommandLineArgs,
    event_config: &mut events::TraceEventConfig,
) -> Result<config::Config, Error> {
    let result = config::load_config(args.no_config, args.config_file.as_deref());

    if let Some(error) = result.error {
        let path = result.path.unwrap_or_default();

        // A settings file the user named must load; the default one is best-effort.
        if result.explicit_path {
            return Err(Error::Settings {
                path,
                source: error,
            });
        }

        tracing::warn!("ignoring {}: {error}", path.display());
        return Ok(result.config);
    }

    for event in &result.config.logging.debug_events {
        if let Err(err) = event_config.enable(event) {
            tracing::warn!("failed to enable '{event}' events: {err}");
        }
    }

    tracing::debug!(
        target: comptree_core::trace_categories::LOAD,
        "settings loaded from {:?}; tracing {} event class(es)",
        result.path,
        event_config.get_enabled_events().len()
    );

    Ok(result.config)
}
