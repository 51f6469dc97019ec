use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QrBridgeConfig {
    pub scanner: ScannerConfig,
    pub presentation: PresentationConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScannerConfig {
    /// Timeout for capture session setup (device I/O)
    #[serde(default = "default_setup_timeout_secs")]
    pub setup_timeout_secs: u64,

    /// Timeout for capture pipeline teardown
    #[serde(default = "default_teardown_timeout_secs")]
    pub teardown_timeout_secs: u64,

    /// Capacity of the channel relaying decoded payloads to the bridge
    #[serde(default = "default_detection_channel_capacity")]
    pub detection_channel_capacity: usize,
}

/// Defaults applied when a startScanner command omits presentational fields
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PresentationConfig {
    #[serde(default = "default_screen_title")]
    pub screen_title: String,

    #[serde(default = "default_display_text")]
    pub display_text: String,

    /// Hex RGB color for the display text
    #[serde(default = "default_display_text_color")]
    pub display_text_color: String,

    #[serde(default = "default_button_text")]
    pub button_text: String,

    #[serde(default = "default_show_cancel_button")]
    pub show_cancel_button: bool,

    #[serde(default = "default_is_right_to_left")]
    pub is_right_to_left: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Log every published event at debug level
    #[serde(default = "default_debug_events")]
    pub debug_events: bool,
}

impl QrBridgeConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("qrbridge.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default("scanner.setup_timeout_secs", default_setup_timeout_secs())?
            .set_default(
                "scanner.teardown_timeout_secs",
                default_teardown_timeout_secs(),
            )?
            .set_default(
                "scanner.detection_channel_capacity",
                default_detection_channel_capacity() as i64,
            )?
            .set_default("presentation.screen_title", default_screen_title())?
            .set_default("presentation.display_text", default_display_text())?
            .set_default(
                "presentation.display_text_color",
                default_display_text_color(),
            )?
            .set_default("presentation.button_text", default_button_text())?
            .set_default(
                "presentation.show_cancel_button",
                default_show_cancel_button(),
            )?
            .set_default(
                "presentation.is_right_to_left",
                default_is_right_to_left(),
            )?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .set_default("system.debug_events", default_debug_events())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with QRBRIDGE_ prefix
            .add_source(Environment::with_prefix("QRBRIDGE").separator("__"))
            .build()?;

        let config: QrBridgeConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.setup_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Scanner setup_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.scanner.teardown_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Scanner teardown_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.scanner.detection_channel_capacity == 0 {
            return Err(ConfigError::Message(
                "Detection channel capacity must be greater than 0".to_string(),
            ));
        }

        let color = &self.presentation.display_text_color;
        if color.len() != 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Message(
                "Display text color must be a 6-digit hex RGB value".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Default configuration serialized as TOML, for `--print-config`
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Self::default())
    }
}

impl Default for QrBridgeConfig {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig {
                setup_timeout_secs: default_setup_timeout_secs(),
                teardown_timeout_secs: default_teardown_timeout_secs(),
                detection_channel_capacity: default_detection_channel_capacity(),
            },
            presentation: PresentationConfig {
                screen_title: default_screen_title(),
                display_text: default_display_text(),
                display_text_color: default_display_text_color(),
                button_text: default_button_text(),
                show_cancel_button: default_show_cancel_button(),
                is_right_to_left: default_is_right_to_left(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
                debug_events: default_debug_events(),
            },
        }
    }
}

fn default_setup_timeout_secs() -> u64 {
    10
}

fn default_teardown_timeout_secs() -> u64 {
    5
}

fn default_detection_channel_capacity() -> usize {
    8
}

fn default_screen_title() -> String {
    "Scan QR Code.".to_string()
}

fn default_display_text() -> String {
    "Point your phone to the QR code to scan it".to_string()
}

fn default_display_text_color() -> String {
    "0b0b0b".to_string()
}

fn default_button_text() -> String {
    "I don't have a QR Code".to_string()
}

fn default_show_cancel_button() -> bool {
    false
}

fn default_is_right_to_left() -> bool {
    false
}

fn default_event_bus_capacity() -> usize {
    64
}

fn default_debug_events() -> bool {
    false
}
