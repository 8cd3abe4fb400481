use anyhow::{Context, Error};
use confique::Config;
use std::{
    path::Path,
    sync::{Arc, OnceLock},
    time::Duration,
};

/// Read when no configuration file is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Config)]
pub struct ReporterConfig {
    /// Comma separated list of accumulator addresses
    #[config(env = "ACCUMULATOR_ADDR", default = "http://localhost:8080")]
    pub accumulator_addr: String,

    /// Bearer token sent to the accumulators
    #[config(env = "ACCUMULATOR_TOKEN")]
    pub accumulator_token: Option<String>,

    #[config(env = "CAPI_ADDR", default = "http://localhost:8081")]
    pub capi_addr: String,

    #[config(env = "METRICS_HOST", default = "localhost")]
    pub metrics_host: String,

    #[config(env = "METRICS_PORT", default = 2003)]
    pub metrics_port: u16,

    #[config(env = "GRAPHITE_PREFIX", default = "noisy-neighbor")]
    pub graphite_prefix: String,

    #[config(env = "SKIP_CERT_VERIFY", default = false)]
    pub skip_cert_verify: bool,

    #[config(env = "REPORT_INTERVAL", default = "1m")]
    pub report_interval: String,

    #[config(env = "REPORT_LIMIT", default = 50)]
    pub report_limit: usize,

    #[config(env = "HTTP_TIMEOUT", default = "5s")]
    pub http_timeout: String,

    #[config(env = "GRAPHITE_TIMEOUT", default = "5s")]
    pub graphite_timeout: String,
}

impl ReporterConfig {
    /// Loads from the environment, falling back to `path` (or
    /// `settings.toml` when `None`) for the variables that are not set.
    pub fn load(path: Option<&Path>) -> Result<ReporterConfig, Error> {
        let file = path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let c = ReporterConfig::builder().env().file(file).load()?;

        Ok(c)
    }

    pub fn parse_report_interval(&self) -> Result<Duration, Error> {
        let interval = parse_duration("report_interval", &self.report_interval)?;
        if interval.is_zero() {
            anyhow::bail!("report_interval must be greater than zero");
        }
        Ok(interval)
    }

    pub fn parse_http_timeout(&self) -> Result<Duration, Error> {
        parse_duration("http_timeout", &self.http_timeout)
    }

    pub fn parse_graphite_timeout(&self) -> Result<Duration, Error> {
        parse_duration("graphite_timeout", &self.graphite_timeout)
    }

    pub fn accumulator_addresses(&self) -> Vec<String> {
        self.accumulator_addr
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration, Error> {
    humantime::parse_duration(value.trim())
        .with_context(|| format!("Invalid duration for {}: {:?}", field, value))
}

static REPORTER_CONFIG: OnceLock<Arc<ReporterConfig>> = OnceLock::new();

/// The configuration stored by [`load_configuration_from`].
pub fn get() -> Result<Arc<ReporterConfig>, Error> {
    match REPORTER_CONFIG.get() {
        Some(config) => Ok(Arc::clone(config)),
        None => anyhow::bail!("configuration is not loaded"),
    }
}

/// Loads the configuration and stores it for [`get`]. Later calls keep the
/// configuration of the first successful one.
pub fn load_configuration_from(path: Option<&Path>) -> Result<(), Error> {
    if REPORTER_CONFIG.get().is_none() {
        let config = ReporterConfig::load(path)?;
        let _ = REPORTER_CONFIG.set(Arc::new(config));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_config() {
        let config = ReporterConfig::load(None).unwrap();

        assert_eq!(config.metrics_port, 2003);
        assert_eq!(config.graphite_prefix, "noisy-neighbor");
        assert_eq!(config.report_limit, 50);
        assert!(!config.skip_cert_verify);
        assert!(config.accumulator_token.is_none());

        temp_env::with_vars(
            [
                ("METRICS_PORT", Some("2004")),
                ("GRAPHITE_PREFIX", Some("test")),
                ("SKIP_CERT_VERIFY", Some("true")),
                ("ACCUMULATOR_TOKEN", Some("bearer-token")),
            ],
            || {
                let config = ReporterConfig::load(None).unwrap();
                assert_eq!(config.metrics_port, 2004);
                assert_eq!(config.graphite_prefix, "test");
                assert!(config.skip_cert_verify);
                assert_eq!(config.accumulator_token.as_deref(), Some("bearer-token"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_parse_report_interval() {
        let config = ReporterConfig::load(None).unwrap();
        assert_eq!(
            config.parse_report_interval().unwrap(),
            Duration::from_secs(60)
        );
        assert_eq!(config.parse_http_timeout().unwrap(), Duration::from_secs(5));
        assert_eq!(
            config.parse_graphite_timeout().unwrap(),
            Duration::from_secs(5)
        );

        temp_env::with_var("REPORT_INTERVAL", Some("30s"), || {
            let config = ReporterConfig::load(None).unwrap();
            assert_eq!(
                config.parse_report_interval().unwrap(),
                Duration::from_secs(30)
            );
        });

        temp_env::with_var("REPORT_INTERVAL", Some("1m 30s"), || {
            let config = ReporterConfig::load(None).unwrap();
            assert_eq!(
                config.parse_report_interval().unwrap(),
                Duration::from_secs(90)
            );
        });

        temp_env::with_var("REPORT_INTERVAL", Some("0s"), || {
            let config = ReporterConfig::load(None).unwrap();
            assert!(config.parse_report_interval().is_err());
        });

        temp_env::with_var("REPORT_INTERVAL", Some("soon"), || {
            let config = ReporterConfig::load(None).unwrap();
            assert!(config.parse_report_interval().is_err());
        });
    }

    #[test]
    #[serial]
    fn test_accumulator_addresses() {
        temp_env::with_var(
            "ACCUMULATOR_ADDR",
            Some("http://acc-0:8080, http://acc-1:8080,,"),
            || {
                let config = ReporterConfig::load(None).unwrap();
                assert_eq!(
                    config.accumulator_addresses(),
                    vec!["http://acc-0:8080", "http://acc-1:8080"]
                );
            },
        );
    }

    #[test]
    #[serial]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join("graphite-reporter-test-settings.toml");
        let toml = "graphite_prefix = \"from-file\"\nmetrics_port = 2010\n";
        std::fs::write(&path, toml).unwrap();

        let config = ReporterConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.graphite_prefix, "from-file");
        assert_eq!(config.metrics_port, 2010);

        temp_env::with_var("GRAPHITE_PREFIX", Some("from-env"), || {
            let config = ReporterConfig::load(Some(path.as_path())).unwrap();
            assert_eq!(config.graphite_prefix, "from-env");
            assert_eq!(config.metrics_port, 2010);
        });

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    #[serial]
    fn test_load_configuration_from() {
        load_configuration_from(None).unwrap();
        let config = get().unwrap();
        assert_eq!(config.metrics_port, 2003);

        // The first loaded configuration is kept.
        temp_env::with_var("METRICS_PORT", Some("2004"), || {
            load_configuration_from(None).unwrap();
            assert_eq!(get().unwrap().metrics_port, 2003);
        });
    }
}
