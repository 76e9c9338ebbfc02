//! Probe configuration management

use anyhow::{Context, Result, anyhow};
use common::DeviceFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use usbwrap::LogLevel;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_LIBUSB_LOG_LEVELS: [&str; 5] = ["none", "error", "warning", "info", "debug"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProbeConfig {
    #[serde(default)]
    pub probe: ProbeSettings,
    #[serde(default)]
    pub usb: UsbSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Log level for this tool (trace, debug, info, warn, error)
    #[serde(default = "ProbeSettings::default_log_level")]
    pub log_level: String,
    /// libusb's own log level (none, error, warning, info, debug)
    #[serde(default = "ProbeSettings::default_libusb_log_level")]
    pub libusb_log_level: String,
    /// Transfer timeout in milliseconds (0 = wait forever)
    #[serde(default = "ProbeSettings::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            libusb_log_level: Self::default_libusb_log_level(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl ProbeSettings {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_libusb_log_level() -> String {
        "info".to_string()
    }

    fn default_timeout_ms() -> u64 {
        1000
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsbSettings {
    /// Device filters ("0xVID:0xPID", "0xVID:*", "*:0xPID"); empty = all
    #[serde(default)]
    pub filters: Vec<String>,
    /// Claim every interface of each opened device
    #[serde(default)]
    pub claim_interfaces: bool,
    /// Let libusb detach kernel drivers before claiming
    #[serde(default = "UsbSettings::default_detach_kernel_driver")]
    pub detach_kernel_driver: bool,
}

impl Default for UsbSettings {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            claim_interfaces: false,
            detach_kernel_driver: Self::default_detach_kernel_driver(),
        }
    }
}

impl UsbSettings {
    fn default_detach_kernel_driver() -> bool {
        true
    }
}

impl ProbeConfig {
    /// Load configuration from the specified path, or the first standard
    /// location that exists.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p
        } else {
            let candidates = vec![
                Self::default_path(),
                PathBuf::from("/etc/usb-probe/probe.toml"),
            ];

            candidates
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| anyhow!("No configuration file found, using defaults"))?
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: ProbeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default() -> Self {
        match Self::load(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usb-probe").join("probe.toml")
        } else {
            PathBuf::from(".config/usb-probe/probe.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.probe.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.probe.log_level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if !VALID_LIBUSB_LOG_LEVELS.contains(&self.probe.libusb_log_level.as_str()) {
            return Err(anyhow!(
                "Invalid libusb log level '{}', must be one of: {}",
                self.probe.libusb_log_level,
                VALID_LIBUSB_LOG_LEVELS.join(", ")
            ));
        }

        self.device_filter()?;
        Ok(())
    }

    pub fn device_filter(&self) -> Result<DeviceFilter> {
        Ok(DeviceFilter::parse(&self.usb.filters)?)
    }

    pub fn libusb_log_level(&self) -> LogLevel {
        match self.probe.libusb_log_level.as_str() {
            "none" => LogLevel::None,
            "error" => LogLevel::Error,
            "warning" => LogLevel::Warning,
            "debug" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.probe.timeout_ms)
    }
}

/// Expand `~` in a user supplied config path
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}
