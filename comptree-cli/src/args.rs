use clap::{Parser, builder::styling};
use std::path::PathBuf;

use crate::{events, productinfo};

const SHORT_DESCRIPTION: &str = "Compile YAML completion rules into bash completion scripts";

const LONG_DESCRIPTION: &str = r"
comptree reads a tree of completion rules from a YAML file (subcommands, flags, fixed values and
shell commands that produce values) and compiles it into a standalone bash completion script.

Validation problems in the rules are reported as warnings; a script is still produced.
";

const VERSION: &str = const_format::concatcp!(
    productinfo::PRODUCT_VERSION,
    " (",
    productinfo::PRODUCT_GIT_VERSION,
    ")"
);

/// Default path of the rule file.
pub const DEFAULT_CONFIG_PATH: &str = "comptree.yaml";

/// Default path of the script to install.
pub const DEFAULT_SCRIPT_PATH: &str = "comptree.bash";

/// Path argument meaning stdin or stdout.
pub const STDIO_PATH: &str = "-";

/// Parsed command-line arguments for comptree.
#[derive(Parser)]
#[clap(name = productinfo::PRODUCT_NAME,
       version = VERSION,
       about = SHORT_DESCRIPTION,
       long_about = LONG_DESCRIPTION,
       author,
       styles = help_styles())]
pub struct CommandLineArgs {
    /// Enable debug logging for classes of tracing events.
    #[clap(long = "debug", value_name = "EVENT", global = true)]
    pub enabled_debug_events: Vec<events::TraceEvent>,

    /// Disable colorized output.
    #[clap(long = "disable-color", global = true)]
    pub disable_color: bool,

    /// Path to a settings file to load instead of the default.
    #[clap(long = "config-file", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    /// Don't load any settings file.
    #[clap(long = "no-config", global = true, conflicts_with = "config_file")]
    pub no_config: bool,

    /// Command to run.
    #[clap(subcommand)]
    pub command: Command,
}

/// A comptree command.
#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Generate the completion script to a file or stdout.
    Generate(GenerateArgs),
    /// Print the completion script to stdout.
    Preview(PreviewArgs),
    /// Check a rule file and report problems.
    Validate(ValidateArgs),
    /// Show the completions the script would offer for a command line.
    Test(TestArgs),
    /// Write a sample rule file.
    Init(InitArgs),
    /// Install a completion script into the bash completions directory.
    Install(InstallArgs),
    /// Remove an installed completion script.
    Uninstall(UninstallArgs),
}

/// Arguments for `comptree generate`.
#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Path to the rule file; use '-' to read from stdin.
    #[clap(env = "COMPTREE_CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: String,

    /// Path to the output script; use '-' for stdout. Defaults to the rule file's
    /// path with a .bash extension, or stdout when reading from stdin.
    #[clap(env = "COMPTREE_OUTPUT_PATH")]
    pub output_path: Option<String>,

    /// Name of the completion function.
    #[clap(short = 'f', long = "function", value_name = "NAME")]
    pub function: Option<String>,

    /// Wrap the script inside a function that prints it, for embedding the
    /// script in another one.
    #[clap(short = 'w', long = "wrap", value_name = "NAME")]
    pub wrap: Option<String>,
}

impl GenerateArgs {
    /// Where the script goes when no output path is given.
    pub fn resolved_output_path(&self) -> String {
        if let Some(output_path) = &self.output_path {
            return output_path.clone();
        }

        if self.config_path == STDIO_PATH {
            String::from(STDIO_PATH)
        } else {
            PathBuf::from(&self.config_path)
                .with_extension("bash")
                .display()
                .to_string()
        }
    }
}

/// Arguments for `comptree preview`.
#[derive(Debug, clap::Args)]
pub struct PreviewArgs {
    /// Path to the rule file; use '-' to read from stdin.
    #[clap(env = "COMPTREE_CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: String,

    /// Name of the completion function.
    #[clap(short = 'f', long = "function", value_name = "NAME")]
    pub function: Option<String>,
}

/// Arguments for `comptree validate`.
#[derive(Debug, clap::Args)]
pub struct ValidateArgs {
    /// Path to the rule file; use '-' to read from stdin.
    #[clap(env = "COMPTREE_CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: String,
}

/// Arguments for `comptree test`.
#[derive(Debug, clap::Args)]
pub struct TestArgs {
    /// The command line to complete, e.g. "mygit push o". A trailing space
    /// completes a new, empty word.
    pub line: String,

    /// Path to the rule file; use '-' to read from stdin.
    #[clap(
        short = 'c',
        long = "config",
        value_name = "PATH",
        env = "COMPTREE_CONFIG_PATH",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config_path: String,
}

/// Arguments for `comptree init`.
#[derive(Debug, clap::Args)]
pub struct InitArgs {
    /// Path of the rule file to create.
    #[clap(env = "COMPTREE_CONFIG_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    /// Overwrite an existing file.
    #[clap(long = "force")]
    pub force: bool,
}

/// Arguments for `comptree install`.
#[derive(Debug, clap::Args)]
pub struct InstallArgs {
    /// Name of the program the script completes.
    pub program: String,

    /// Path to the script; use '-' to read it from stdin.
    #[clap(default_value = DEFAULT_SCRIPT_PATH)]
    pub script_path: String,

    /// Overwrite an existing installed script.
    #[clap(short = 'f', long = "force")]
    pub force: bool,

    /// Print the install command instead of running it.
    #[clap(short = 'd', long = "dry")]
    pub dry: bool,
}

/// Arguments for `comptree uninstall`.
#[derive(Debug, clap::Args)]
pub struct UninstallArgs {
    /// Name of the program whose script to remove.
    pub program: String,

    /// Print the uninstall command instead of running it.
    #[clap(short = 'd', long = "dry")]
    pub dry: bool,
}

/// Returns clap styling to be used for command-line help.
#[doc(hidden)]
fn help_styles() -> clap::builder::Styles {
    styling::Styles::styled()
        .header(
            styling::AnsiColor::Yellow.on_default()
                | styling::Effects::BOLD
                | styling::Effects::UNDERLINE,
        )
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Magenta.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
}
