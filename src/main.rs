use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use qrbridge::{
    AuthorizationStatus, CommandBridge, CommandInvocation, EventBus, MetadataObject, MockPlatform,
    QrBridgeConfig, SessionController,
};

#[derive(Parser, Debug)]
#[command(name = "qrbridge")]
#[command(about = "Harness running the QR scanner bridge against a mock platform")]
#[command(version)]
#[command(long_about = "Runs one startScanner/stopScanner cycle of the scanner bridge \
against the in-tree mock platform: permission check, capture session setup, preview \
attach, synthetic QR detection and result delivery. Useful for exercising the plugin \
outside a hybrid-app host.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "qrbridge.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", help = "Append logs to a file in addition to stderr")]
    log_file: Option<String>,

    /// Payload the simulated QR code carries
    #[arg(long, default_value = "https://example.com/checkin", help = "Payload of the synthetic QR code")]
    payload: String,

    /// Simulated camera authorization state
    #[arg(long, value_enum, default_value = "not-determined", help = "Camera authorization state the mock platform reports")]
    authorization: AuthorizationArg,

    /// Simulate a device without a camera
    #[arg(long, help = "Report no available video device")]
    no_device: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AuthorizationArg {
    Granted,
    Denied,
    Restricted,
    NotDetermined,
}

impl From<AuthorizationArg> for AuthorizationStatus {
    fn from(arg: AuthorizationArg) -> Self {
        match arg {
            AuthorizationArg::Granted => AuthorizationStatus::Granted,
            AuthorizationArg::Denied => AuthorizationStatus::Denied,
            AuthorizationArg::Restricted => AuthorizationStatus::Restricted,
            AuthorizationArg::NotDetermined => AuthorizationStatus::NotDetermined,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", QrBridgeConfig::default_toml()?);
        return Ok(());
    }

    let _log_guard = init_logging(&args)?;

    info!("Starting qrbridge harness v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match QrBridgeConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    config.validate()?;

    let platform = MockPlatform::with_authorization(args.authorization.into());
    if args.no_device {
        platform.backend.set_device(None);
    }

    let event_bus = if config.system.debug_events {
        Arc::new(EventBus::with_debug_logging(config.system.event_bus_capacity))
    } else {
        Arc::new(EventBus::new(config.system.event_bus_capacity))
    };

    let controller = Arc::new(SessionController::new(
        config.scanner.clone(),
        platform.permissions.clone(),
        platform.backend.clone(),
        platform.preview.clone(),
        Arc::clone(&event_bus),
    ));
    let bridge = CommandBridge::new(Arc::clone(&controller), config, Arc::clone(&event_bus));

    // Narrate lifecycle events while the cycle runs
    let mut events = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(kind = event.event_type(), "{}", event.description());
        }
    });

    // Simulated user pointing the camera at a QR code
    let backend = Arc::clone(&platform.backend);
    let payload = args.payload.clone();
    tokio::spawn(async move {
        for _ in 0..100 {
            if let Some(handle) = backend.last_handle() {
                if handle.is_running() {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    handle.emit_frame(&[MetadataObject::qr(payload.clone())]);
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    // The host channel hands the bridge raw command objects
    let result = bridge
        .dispatch_json(r#"{"command": "startScanner"}"#)
        .await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    let ack = bridge.dispatch(CommandInvocation::stop_scanner()).await;
    println!("{}", serde_json::to_string_pretty(&ack)?);

    Ok(())
}

fn init_logging(args: &Args) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("qrbridge={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().with_writer(std::io::stderr).boxed()
        }
    };

    let registry = tracing_subscriber::registry().with(fmt_layer).with(env_filter);

    if let Some(path) = &args.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .init();
        Ok(Some(guard))
    } else {
        registry.init();
        Ok(None)
    }
}
