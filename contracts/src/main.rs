//! Interface contract checker.
//!
//! Declares the interfaces and implementations of a TOML manifest and reports
//! every implementation that does not satisfy its contracts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;

use contracts::check::{call_method, check_manifest, describe_members};
use contracts::io::config::{ContractsConfig, write_config};
use contracts::{exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "contracts",
    version,
    about = "Declaration-time checker for interface contracts"
)]
struct Cli {
    /// Naming policy overrides (missing file means defaults).
    #[arg(long, global = true, default_value = "contracts.toml")]
    config: PathBuf,

    /// Log declaration details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default naming policy to the `--config` path.
    Init {
        /// Replace an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Declare everything in the manifest and report rejected implementations.
    Check { manifest: PathBuf },
    /// List the members visible on an interface, inherited ones included.
    Members { manifest: PathBuf, interface: String },
    /// Instantiate an implementation and call one of its methods.
    Call {
        manifest: PathBuf,
        implementation: String,
        method: String,
        /// Arguments as JSON values; bare words are passed as strings.
        args: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Check { manifest } => cmd_check(&manifest, &cli.config),
        Command::Members {
            manifest,
            interface,
        } => cmd_members(&manifest, &cli.config, &interface),
        Command::Call {
            manifest,
            implementation,
            method,
            args,
        } => cmd_call(&manifest, &cli.config, &implementation, &method, &args),
    }
}

fn cmd_check(manifest: &Path, config: &Path) -> Result<i32> {
    let (_, report) = check_manifest(manifest, config)?;
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(_) => println!("ok: {}", outcome.name),
            Err(err) => println!("rejected: {}\n{}", outcome.name, err),
        }
    }
    if report.is_clean() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::REJECTED)
    }
}

fn cmd_init(config: &Path, force: bool) -> Result<i32> {
    if config.exists() && !force {
        bail!(
            "{} already exists (pass --force to replace it)",
            config.display()
        );
    }
    write_config(config, &ContractsConfig::default())?;
    println!("wrote {}", config.display());
    Ok(exit_codes::OK)
}

fn cmd_members(manifest: &Path, config: &Path, interface: &str) -> Result<i32> {
    let (registry, _) = check_manifest(manifest, config)?;
    for line in describe_members(&registry, interface)? {
        println!("{}", line);
    }
    Ok(exit_codes::OK)
}

fn cmd_call(
    manifest: &Path,
    config: &Path,
    implementation: &str,
    method: &str,
    args: &[String],
) -> Result<i32> {
    let (registry, _) = check_manifest(manifest, config)?;
    let args: Vec<Value> = args.iter().map(String::as_str).map(parse_arg).collect();
    let result = call_method(&registry, implementation, method, &args)?;
    let rendered = serde_json::to_string(&result).context("serialize result")?;
    println!("{}", rendered);
    Ok(exit_codes::OK)
}

fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["contracts", "check", "manifest.toml"]);
        assert!(matches!(cli.command, Command::Check { .. }));
        assert_eq!(cli.config, PathBuf::from("contracts.toml"));
    }

    #[test]
    fn parse_call_with_global_flags() {
        let cli = Cli::parse_from([
            "contracts",
            "call",
            "m.toml",
            "EnglishGreeter",
            "greet",
            "42",
            "--config",
            "custom.toml",
            "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        match cli.command {
            Command::Call { args, method, .. } => {
                assert_eq!(method, "greet");
                assert_eq!(args, vec!["42".to_string()]);
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["contracts", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn args_fall_back_to_strings() {
        assert_eq!(parse_arg("42"), Value::from(42));
        assert_eq!(parse_arg("hello"), Value::from("hello"));
    }
}
