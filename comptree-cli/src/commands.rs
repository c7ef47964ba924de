//! Implementations of the `comptree` subcommands.

use std::io::{Read, Write};
use std::path::Path;

use comptree_core::simulate::{self, Request, ShellRunner};
use comptree_core::{Compilation, CompileOptions, compile};

use crate::args::{
    Command, GenerateArgs, InitArgs, InstallArgs, PreviewArgs, STDIO_PATH, TestArgs,
    UninstallArgs, ValidateArgs,
};
use crate::config::Config;
use crate::error::Error;
use crate::error_formatter::Formatter;
use crate::installer::Installer;

/// Rule file written by `comptree init`.
pub(crate) const SAMPLE_CONFIG: &str = r#"# Completion rules for mygit.
#
# Each key is a word (or several words) that must already be typed; each value
# says what to offer next. Lists are fixed candidates, strings are shell commands
# whose output supplies candidates, and '*' matches any word.

mygit:
  - --help
  - --version
  - status
  - init
  - commit

mygit status:
  - --help
  - --verbose
  - --branch
  - <file>

mygit init:
  "*": [--bare, <directory>]

mygit commit: git status --short | cut -c4-
"#;

/// Everything a command needs besides its own arguments.
pub(crate) struct Context {
    pub config: Config,
    pub formatter: Formatter,
}

/// Runs a command. Returns the process exit code.
pub(crate) fn run(command: &Command, context: &Context) -> Result<u8, Error> {
    match command {
        Command::Generate(args) => generate(args, context),
        Command::Preview(args) => preview(args, context),
        Command::Validate(args) => validate(args),
        Command::Test(args) => test(args),
        Command::Init(args) => init(args),
        Command::Install(args) => install(args, context),
        Command::Uninstall(args) => uninstall(args, context),
    }
}

fn generate(args: &GenerateArgs, context: &Context) -> Result<u8, Error> {
    let options = CompileOptions::builder()
        .maybe_function_name(args.function.clone())
        .maybe_wrap(args.wrap.clone().or_else(|| context.config.generate.wrap.clone()))
        .build();

    let compilation = compile_file(&args.config_path, &options)?;
    let output_path = args.resolved_output_path();

    write_output(&output_path, &compilation.script)?;
    if output_path != STDIO_PATH {
        println!("Saved {output_path}");
    }

    report_warnings(&compilation, context);
    Ok(0)
}

fn preview(args: &PreviewArgs, context: &Context) -> Result<u8, Error> {
    let options = CompileOptions::builder()
        .maybe_function_name(args.function.clone())
        .build();

    let compilation = compile_file(&args.config_path, &options)?;
    write_output(STDIO_PATH, &compilation.script)?;

    report_warnings(&compilation, context);
    Ok(0)
}

fn validate(args: &ValidateArgs) -> Result<u8, Error> {
    let compilation = compile_file(&args.config_path, &CompileOptions::default())?;

    if compilation.is_valid() {
        println!("{} is valid", args.config_path);
        return Ok(0);
    }

    for diagnostic in &compilation.diagnostics {
        println!("{diagnostic}");
    }
    println!(
        "{} has {} problem(s)",
        args.config_path,
        compilation.diagnostics.len()
    );

    Ok(1)
}

fn test(args: &TestArgs) -> Result<u8, Error> {
    let request =
        Request::from_line(&args.line).ok_or_else(|| Error::NothingToComplete(args.line.clone()))?;

    let compilation = compile_file(&args.config_path, &CompileOptions::default())?;

    for candidate in simulate::complete(&compilation.table, &request, &ShellRunner) {
        println!("{candidate}");
    }

    Ok(0)
}

fn init(args: &InitArgs) -> Result<u8, Error> {
    if args.config_path.exists() && !args.force {
        return Err(Error::AlreadyExists(args.config_path.clone()));
    }

    std::fs::write(&args.config_path, SAMPLE_CONFIG).map_err(|source| Error::Write {
        path: args.config_path.display().to_string(),
        source,
    })?;

    println!("Saved {}", args.config_path.display());
    Ok(0)
}

fn install(args: &InstallArgs, context: &Context) -> Result<u8, Error> {
    let settings = &context.config.install;
    let use_sudo = settings.use_sudo.unwrap_or(true);

    let installer = if args.script_path == STDIO_PATH {
        Installer::from_reader(
            args.program.as_str(),
            std::io::stdin().lock(),
            settings.target_directories.clone(),
            use_sudo,
        )?
    } else {
        Installer::builder()
            .program(args.program.as_str())
            .script_path(Path::new(&args.script_path))
            .maybe_target_directories(settings.target_directories.clone())
            .use_sudo(use_sudo)
            .build()
    };

    if args.dry {
        println!("{}", installer.install_command_string()?);
        return Ok(0);
    }

    let target_path = installer.install(args.force)?;
    println!("Saved {}", target_path.display());
    Ok(0)
}

fn uninstall(args: &UninstallArgs, context: &Context) -> Result<u8, Error> {
    let settings = &context.config.install;

    let installer = Installer::builder()
        .program(args.program.as_str())
        .maybe_target_directories(settings.target_directories.clone())
        .use_sudo(settings.use_sudo.unwrap_or(true))
        .build();

    if args.dry {
        println!("{}", installer.uninstall_command_string());
        return Ok(0);
    }

    installer.uninstall()?;
    println!(
        "Removed {} from {} director(ies)",
        args.program,
        installer.target_directories().len()
    );
    Ok(0)
}

fn compile_file(path: &str, options: &CompileOptions) -> Result<Compilation, Error> {
    let text = read_input(path)?;
    compile(&text, options).map_err(|source| Error::Compile {
        path: path.to_owned(),
        source,
    })
}

fn read_input(path: &str) -> Result<String, Error> {
    let read_error = |source| Error::Read {
        path: path.to_owned(),
        source,
    };

    if path == STDIO_PATH {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(read_error)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(read_error)
    }
}

fn write_output(path: &str, text: &str) -> Result<(), Error> {
    let write_error = |source| Error::Write {
        path: path.to_owned(),
        source,
    };

    if path == STDIO_PATH {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes()).map_err(write_error)?;
        stdout.flush().map_err(write_error)
    } else {
        std::fs::write(path, text).map_err(write_error)
    }
}

fn report_warnings(compilation: &Compilation, context: &Context) {
    for diagnostic in &compilation.diagnostics {
        eprint!("{}", context.formatter.format_warning(diagnostic));
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_config_is_clean() -> Result<()> {
        let compilation = compile(SAMPLE_CONFIG, &CompileOptions::default())?;
        assert!(compilation.is_valid(), "{:?}", compilation.diagnostics);
        assert_eq!(compilation.table.programs(), ["mygit"]);
        Ok(())
    }
}
