#![forbid(unsafe_code)]
//! docargs command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use docargs::commands::{
    execute_check, execute_inspect, execute_list, execute_parse, execute_usage, CheckOptions,
    InspectOptions, ListOptions, ParseOptions, UsageOptions,
};
use docargs::config::DEFAULT_CONFIG_FILE;
use docargs::Config;

#[derive(Parser)]
#[command(name = "docargs")]
#[command(about = "Run documented script methods with typed command-line arguments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the methods a script exposes
    List {
        /// Script file
        file: PathBuf,
    },

    /// Show help for one method
    Usage {
        /// Script file
        file: PathBuf,

        /// Method name
        method: String,
    },

    /// Print the parsed documentation of a method as JSON
    Inspect {
        /// Script file
        file: PathBuf,

        /// Method name
        method: String,
    },

    /// Check that documentation matches method signatures
    Check {
        /// Files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Resolve arguments for a method and print them as JSON
    Parse {
        /// Script file
        file: PathBuf,

        /// Method name
        method: String,

        /// Parse every argument as JSON
        #[arg(short = 'j', long)]
        json_args: bool,

        /// Evaluate every argument as an expression
        #[arg(short = 'e', long)]
        eval_args: bool,

        /// Like --eval-args, keeping arguments that fail to evaluate
        #[arg(short = 'E', long)]
        eval_lax: bool,

        /// Abort when a value is outside its documented types or choices
        #[arg(long)]
        strict: bool,

        /// Arguments passed to the method
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", style("✗").red(), e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config
    let mut config = Config::load_or_default(&cli.config)?.with_env_overrides();
    if cli.verbose {
        config.debug = true;
    }
    init_logging(config.debug);

    match cli.command {
        Commands::List { file } => {
            execute_list(ListOptions { file, config })?;
        }

        Commands::Usage { file, method } => {
            execute_usage(UsageOptions {
                file,
                method,
                config,
            })?;
        }

        Commands::Inspect { file, method } => {
            execute_inspect(InspectOptions {
                file,
                method,
                config,
            })?;
        }

        Commands::Check { patterns } => {
            execute_check(CheckOptions { patterns, config })?;
        }

        Commands::Parse {
            file,
            method,
            json_args,
            eval_args,
            eval_lax,
            strict,
            tokens,
        } => {
            let strict = strict || config.strict_input;
            execute_parse(ParseOptions {
                file,
                method,
                tokens,
                json_args,
                eval_args,
                eval_lax,
                strict,
                config,
            })?;
        }
    }

    Ok(())
}
