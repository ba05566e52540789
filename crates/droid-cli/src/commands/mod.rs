use clap::{Parser, Subcommand};
use std::path::PathBuf;

use droid_config::{ConfigLoader, DroidConfig, Transport};
use droid_core::DroidError;

mod devices;
mod serve;

/// Android device control as MCP tools
#[derive(Parser)]
#[command(name = "droid", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to droid.toml config file
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
    /// Bind a device and serve its tools to an MCP host
    Serve(ServeArgs),
    /// List devices visible to adb
    Devices,
    /// Show the tools exposed to MCP hosts
    Tools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Per-run overrides of the `[server]` and `[device]` sections.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Transport: stdio, http or sse
    #[arg(short, long)]
    transport: Option<Transport>,

    /// Bind host for http/sse
    #[arg(long)]
    host: Option<String>,

    /// Bind port for http/sse
    #[arg(short, long)]
    port: Option<u16>,

    /// Device serial to bind (overrides [device] name)
    #[arg(short, long)]
    device: Option<String>,
}

impl ServeArgs {
    /// Layer the flags over the loaded config and re-validate.
    pub(crate) fn apply(&self, mut config: DroidConfig) -> droid_core::Result<DroidConfig> {
        if let Some(t) = self.transport {
            config.server.transport = t;
        }
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref device) = self.device {
            config.device.name = Some(device.clone());
        }
        config.validate().map_err(DroidError::Config)?;
        Ok(config)
    }
}

impl Cli {
    pub async fn run(self) -> droid_core::Result<()> {
        // Load before tracing so the config can pick the log format
        let config_path = ConfigLoader::resolve_path(self.config.as_deref());
        let config_loader = ConfigLoader::load_with(&config_path, |key| std::env::var(key).ok())?;

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug".to_string()
        } else if self.quiet {
            "error".to_string()
        } else {
            self.log_level
                .clone()
                .unwrap_or_else(|| config_loader.get().logging.level.clone())
        };
        init_tracing(&log_level, &config_loader.get().logging.format);
        config_loader.log_notices();

        let config = config_loader.into_config();
        match self.command {
            Commands::Serve(args) => serve::cmd_serve(args.apply(config)?).await,
            Commands::Devices => devices::cmd_devices(&config).await,
            Commands::Tools { json } => Self::cmd_tools(json),
            Commands::Config { json } => Self::cmd_config(&config, json),
        }
    }

    fn cmd_tools(json: bool) -> droid_core::Result<()> {
        let tools = droid_device::DeviceTools::definitions();
        if json {
            println!("{}", serde_json::to_string_pretty(&tools)?);
            return Ok(());
        }
        for tool in &tools {
            println!("{}", tool.name);
            println!("    {}", tool.description);
        }
        Ok(())
    }

    fn cmd_config(config: &DroidConfig, json: bool) -> droid_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config).map_err(|e| DroidError::Config(e.to_string()))?
            );
        }
        Ok(())
    }
}

/// Install the global subscriber. Output goes to stderr; stdout belongs to
/// the stdio transport.
fn init_tracing(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
