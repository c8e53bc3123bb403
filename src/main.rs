//! common-params CLI - inspect and exercise common parameter binding

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;

use common_params::args::parse_tokens;
use common_params::{
    Config, FixSuggestion, Invocation, InvocationScript, ParamError, Scope, COMMON_PARAMETERS,
    JOB_PARAMETERS,
};

#[derive(Parser)]
#[command(name = "common-params")]
#[command(about = "Common parameters for pipeline command invocations")]
#[command(version)]
struct Cli {
    /// YAML config with ambient preferences and legal sets
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the common parameter table
    Params {
        /// List the job-mode parameter metadata instead
        #[arg(long)]
        jobs: bool,
    },

    /// Bind common arguments and print the effective set as JSON
    Bind {
        /// Argument tokens, e.g. -ErrorVariable +errs -ea Stop
        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        tokens: Vec<String>,
    },

    /// Run an invocation script and print the emissions and final scope
    Run {
        /// Path to the invocation script (.yaml)
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Params { jobs } => {
            print_params(jobs);
            Ok(())
        }
        Commands::Bind { tokens } => bind(&config, &tokens),
        Commands::Run { file } => run(&config, &file),
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, ParamError> {
    let config = match path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };
    config.with_env()
}

fn print_params(jobs: bool) {
    if jobs {
        for (name, ty) in JOB_PARAMETERS {
            println!("{:<28} {:?}", name.cyan(), ty);
        }
        return;
    }
    println!("{:<22} {:<6} {}", "NAME".bold(), "ALIAS".bold(), "TYPE".bold());
    for decl in COMMON_PARAMETERS.iter() {
        println!(
            "{:<22} {:<6} {}",
            decl.name.cyan(),
            decl.alias,
            decl.kind.type_name()
        );
    }
}

fn bind(config: &Config, tokens: &[String]) -> Result<(), ParamError> {
    let args = parse_tokens(tokens)?;
    let invocation = Invocation::bind(
        config.context(Arc::new(Scope::new())),
        args.iter().map(|(n, v)| (n.as_str(), v)),
    )?;
    let json = invocation
        .parameters()
        .to_json(&invocation.context().ambient);
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn run(config: &Config, file: &std::path::Path) -> Result<(), ParamError> {
    let script = InvocationScript::load(file)?;
    let report = script.run(config)?;
    println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    if let Some(stopped) = report.stopped {
        eprintln!(
            "{} {:?} event resolved to {}",
            "Stopped:".red().bold(),
            stopped.channel,
            stopped.preference
        );
    }
    Ok(())
}
