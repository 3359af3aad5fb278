use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use compile_spec::{RawCompileSpec, build_method_specs, diagnostics};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "compile-spec")]
#[command(about = "Validate and normalize accelerator compile specs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON compile config and print the canonical spec.
    Check {
        #[arg(long)]
        config: String,

        /// Top-level keys are method names, each mapped to its own compile config.
        #[arg(long)]
        methods: bool,

        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Log filter, e.g. "debug" (defaults to RUST_LOG, then "warn").
        #[arg(long)]
        log: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Check {
            config,
            methods,
            out,
            log,
        } => {
            init_tracing(log.as_deref())?;

            let text = std::fs::read_to_string(&config).with_context(|| {
                diagnostics::error_message(format!("read config file {}", config))
            })?;

            // 1) Parse + validate; nothing is printed unless every spec is valid.
            let json = if methods {
                let raw: BTreeMap<String, RawCompileSpec> = serde_json::from_str(&text)
                    .with_context(|| {
                        diagnostics::error_message(format!("parse method map in {}", config))
                    })?;
                if raw.is_empty() {
                    bail!(
                        "{}",
                        diagnostics::error_message(format!("{} contained no methods", config))
                    );
                }
                let specs = build_method_specs(&raw)
                    .map_err(|e| anyhow::anyhow!(diagnostics::error_message(e)))?;
                serde_json::to_string_pretty(&specs)?
            } else {
                let raw: RawCompileSpec = serde_json::from_str(&text).with_context(|| {
                    diagnostics::error_message(format!("parse compile config {}", config))
                })?;
                let spec = raw
                    .validate_and_build()
                    .map_err(|e| anyhow::anyhow!(diagnostics::error_message(e)))?;
                serde_json::to_string_pretty(&spec)?
            };

            // 2) Emit.
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Wrote {}", path);
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(f) => EnvFilter::try_new(f).with_context(|| format!("invalid log filter {:?}", f))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
