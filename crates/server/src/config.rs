use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::store::StoreTimings;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub listen_address: String,
    pub log_dir: String,

    pub startup_delay_ms: u64,
    pub contact_latency_ms: u64,
    pub send_latency_ms: u64,
    pub delivery_delay_ms: u64,
    pub settings_latency_ms: u64,

    pub modem: ModemSettings,
}

/// Modem parameters shown on the settings screen. Never used to reach a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModemSettings {
    pub com_port: String,
    pub baud_rate: u32,
    pub smsc_number: String,
    pub delivery_reports: bool,
    pub multipart_sms: bool,
}

impl Default for ModemSettings {
    fn default() -> Self {
        Self {
            com_port: "COM1".to_string(),
            baud_rate: 9600,
            smsc_number: "+12065550100".to_string(),
            delivery_reports: true,
            multipart_sms: true,
        }
    }
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialGatewayConfig {
    listen_address: Option<String>,
    log_dir: Option<String>,
    startup_delay_ms: Option<u64>,
    contact_latency_ms: Option<u64>,
    send_latency_ms: Option<u64>,
    delivery_delay_ms: Option<u64>,
    settings_latency_ms: Option<u64>,
    com_port: Option<String>,
    baud_rate: Option<u32>,
    smsc_number: Option<String>,
    delivery_reports: Option<bool>,
    multipart_sms: Option<bool>,
}

fn default_listen_address() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let timings = StoreTimings::default();
        Self {
            listen_address: default_listen_address(),
            log_dir: default_log_dir(),
            startup_delay_ms: timings.startup_delay.as_millis() as u64,
            contact_latency_ms: timings.contact_latency.as_millis() as u64,
            send_latency_ms: timings.send_latency.as_millis() as u64,
            delivery_delay_ms: timings.delivery_delay.as_millis() as u64,
            settings_latency_ms: timings.settings_latency.as_millis() as u64,
            modem: ModemSettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Defaults, overridden by the TOML file (if any), overridden by the environment.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path_str) => read_file_config(Path::new(path_str))?,
            None => PartialGatewayConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialGatewayConfig = envy::from_env::<PartialGatewayConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        Ok(merge(env_config, file_config))
    }

    pub fn timings(&self) -> StoreTimings {
        StoreTimings {
            startup_delay: Duration::from_millis(self.startup_delay_ms),
            contact_latency: Duration::from_millis(self.contact_latency_ms),
            send_latency: Duration::from_millis(self.send_latency_ms),
            delivery_delay: Duration::from_millis(self.delivery_delay_ms),
            settings_latency: Duration::from_millis(self.settings_latency_ms),
        }
    }
}

fn read_file_config(path: &Path) -> Result<PartialGatewayConfig, String> {
    if !path.exists() {
        return Ok(PartialGatewayConfig::default());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
    toml::from_str(&contents)
        .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
}

fn merge(env: PartialGatewayConfig, file: PartialGatewayConfig) -> GatewayConfig {
    let defaults = GatewayConfig::default();
    GatewayConfig {
        listen_address: env.listen_address.or(file.listen_address)
            .unwrap_or(defaults.listen_address),
        log_dir: env.log_dir.or(file.log_dir)
            .unwrap_or(defaults.log_dir),
        startup_delay_ms: env.startup_delay_ms.or(file.startup_delay_ms)
            .unwrap_or(defaults.startup_delay_ms),
        contact_latency_ms: env.contact_latency_ms.or(file.contact_latency_ms)
            .unwrap_or(defaults.contact_latency_ms),
        send_latency_ms: env.send_latency_ms.or(file.send_latency_ms)
            .unwrap_or(defaults.send_latency_ms),
        delivery_delay_ms: env.delivery_delay_ms.or(file.delivery_delay_ms)
            .unwrap_or(defaults.delivery_delay_ms),
        settings_latency_ms: env.settings_latency_ms.or(file.settings_latency_ms)
            .unwrap_or(defaults.settings_latency_ms),
        modem: ModemSettings {
            com_port: env.com_port.or(file.com_port)
                .unwrap_or(defaults.modem.com_port),
            baud_rate: env.baud_rate.or(file.baud_rate)
                .unwrap_or(defaults.modem.baud_rate),
            smsc_number: env.smsc_number.or(file.smsc_number)
                .unwrap_or(defaults.modem.smsc_number),
            delivery_reports: env.delivery_reports.or(file.delivery_reports)
                .unwrap_or(defaults.modem.delivery_reports),
            multipart_sms: env.multipart_sms.or(file.multipart_sms)
                .unwrap_or(defaults.modem.multipart_sms),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_simulated_latencies() {
        let timings = GatewayConfig::default().timings();
        assert_eq!(timings.contact_latency, Duration::from_millis(500));
        assert_eq!(timings.send_latency, Duration::from_millis(800));
        assert_eq!(timings.delivery_delay, Duration::from_millis(2000));
        assert_eq!(timings.startup_delay, Duration::from_millis(1000));
    }

    #[test]
    fn file_values_fill_in_and_env_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "listen_address = \"127.0.0.1:9000\"\ndelivery_delay_ms = 50\ncom_port = \"COM3\""
        )
        .unwrap();

        let file_config = read_file_config(file.path()).unwrap();
        let env_config = PartialGatewayConfig {
            delivery_delay_ms: Some(10),
            ..Default::default()
        };
        let config = merge(env_config, file_config);

        assert_eq!(config.listen_address, "127.0.0.1:9000");
        assert_eq!(config.delivery_delay_ms, 10);
        assert_eq!(config.modem.com_port, "COM3");
        assert_eq!(config.modem.baud_rate, 9600);
        assert_eq!(config.send_latency_ms, 800);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let partial = read_file_config(&dir.path().join("absent.toml")).unwrap();
        let config = merge(PartialGatewayConfig::default(), partial);
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "delivery_delay_ms = \"soon\"").unwrap();
        let err = read_file_config(file.path()).unwrap_err();
        assert!(err.contains("Failed to parse TOML"));
    }
}
