use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use console::style;
use std::path::PathBuf;

use switchyard_config::{ConfigLoader, SwitchyardConfig, WarningSeverity};
use switchyard_core::{Capability, Result, SwitchyardError, Tier};

mod models;
mod routing;

/// 🚦 Switchyard: route tasks to the right LLM by cost and complexity
#[derive(Parser)]
#[command(name = "switchyard", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to switchyard.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a task and show which model it would be routed to
    Route {
        /// Task description (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
        /// Required capability: chat, code, vision, reasoning, search, long_context
        #[arg(long)]
        capability: Option<Capability>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record the outcome of a routed task
    Record {
        /// Model id the task ran on
        model: String,
        /// Task description
        task: String,
        /// Mark the task as failed
        #[arg(long)]
        fail: bool,
        /// Observed latency in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,
        /// Error text for a failed task
        #[arg(long)]
        error: Option<String>,
    },
    /// Show per-model outcome statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog models
    Models {
        /// Only show one tier
        #[arg(short, long)]
        tier: Option<Tier>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Audit configuration and routing state
    Doctor,
    /// Show version and build info
    Version,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Load config first so we can use it for log level and format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level
                .as_deref()
                .unwrap_or(config.logging.level.as_str())
        };
        init_tracing(log_level, &config.logging.format);

        match self.command {
            Commands::Route {
                task,
                capability,
                json,
            } => routing::cmd_route(&config, &task.join(" "), capability, json),
            Commands::Record {
                model,
                task,
                fail,
                latency_ms,
                error,
            } => routing::cmd_record(&config, &model, &task, !fail, latency_ms, error.as_deref()),
            Commands::Stats { json } => routing::cmd_stats(&config, json),
            Commands::Models { tier, json } => models::cmd_models(&config, tier, json),
            Commands::Config { json } => Self::cmd_config(&config, json),
            Commands::Doctor => Self::cmd_doctor(&config_loader),
            Commands::Version => Self::cmd_version(),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_config(config: &SwitchyardConfig, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config).map_err(|e| SwitchyardError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_doctor(loader: &ConfigLoader) -> Result<()> {
        let config = loader.config();
        println!("{}", style("🩺 Switchyard Doctor: configuration audit").bold());
        println!();

        let mut ok = 0;
        let mut warn_count = 0;
        let mut info_count = 0;

        if loader.from_file() {
            println!("  ✅ config: {}", loader.path().display());
            ok += 1;
        } else {
            println!(
                "  💡 config: {} not found, using defaults",
                loader.path().display()
            );
            info_count += 1;
        }

        for w in loader.warnings() {
            println!("  {w}");
            match w.severity {
                WarningSeverity::Warning => warn_count += 1,
                WarningSeverity::Info => info_count += 1,
                WarningSeverity::Error => {}
            }
        }
        if loader.warnings().is_empty() {
            println!("  ✅ validation: no findings");
            ok += 1;
        }

        // Routing state beyond basic validation
        let registry = routing::build_registry(config);
        for tier in Tier::ALL {
            if registry.all().iter().any(|m| m.tier == tier) {
                ok += 1;
            } else {
                println!("  💡 catalog: no models in the {tier} tier");
                info_count += 1;
            }
        }
        if registry.needs_discovery() {
            println!(
                "  💡 catalog: model cache {} is missing or older than a day",
                config.catalog.resolved_cache_path().display()
            );
            info_count += 1;
        } else {
            ok += 1;
        }

        let router = routing::build_router(config, registry);
        let stats = router.get_stats();
        let unreliable: Vec<&String> = stats
            .iter()
            .filter(|(_, s)| s.success_rate < 0.5)
            .map(|(model, _)| model)
            .collect();
        if unreliable.is_empty() {
            ok += 1;
        } else {
            for model in unreliable {
                println!("  ⚠️  outcomes: {model} succeeds less than half the time");
                warn_count += 1;
            }
        }

        println!();
        println!(
            "  ✅ {ok} checks passed, ⚠️  {warn_count} warnings, 💡 {info_count} suggestions"
        );
        Ok(())
    }

    fn cmd_version() -> Result<()> {
        println!("🚦 Switchyard v{}", env!("CARGO_PKG_VERSION"));
        println!("   Rust edition: 2024");
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "switchyard", &mut std::io::stdout());
        Ok(())
    }
}

/// Initialize tracing on stderr so command output on stdout stays parseable.
fn init_tracing(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        "json" => builder.json().with_target(true).init(),
        "compact" => builder.compact().with_target(false).init(),
        _ => builder.with_target(false).init(),
    }
}
