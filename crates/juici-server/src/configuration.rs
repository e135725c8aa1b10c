use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use juici::service::MockSettings;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                env_var: to_env_var("server.host"),
                reason: e.to_string(),
            })
    }
}

/// Latency and limits of the mock backend
#[derive(Debug, Deserialize)]
pub struct MockServiceSettings {
    #[serde(default = "default_chat_delay_ms")]
    pub chat_delay_ms: u64,
    #[serde(default = "default_upload_delay_ms")]
    pub upload_delay_ms: u64,
    #[serde(default = "default_stream_chunk_delay_ms")]
    pub stream_chunk_delay_ms: u64,
    #[serde(default = "default_upload_limit_bytes")]
    pub upload_limit_bytes: usize,
}

impl Default for MockServiceSettings {
    fn default() -> Self {
        MockServiceSettings {
            chat_delay_ms: default_chat_delay_ms(),
            upload_delay_ms: default_upload_delay_ms(),
            stream_chunk_delay_ms: default_stream_chunk_delay_ms(),
            upload_limit_bytes: default_upload_limit_bytes(),
        }
    }
}

impl MockServiceSettings {
    pub fn to_mock_settings(&self) -> MockSettings {
        MockSettings {
            chat_delay: Duration::from_millis(self.chat_delay_ms),
            upload_delay: Duration::from_millis(self.upload_delay_ms),
            stream_chunk_delay: Duration::from_millis(self.stream_chunk_delay_ms),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub mock: MockServiceSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("mock.chat_delay_ms", default_chat_delay_ms())?
            .set_default("mock.upload_delay_ms", default_upload_delay_ms())?
            .set_default("mock.stream_chunk_delay_ms", default_stream_chunk_delay_ms())?
            .set_default("mock.upload_limit_bytes", default_upload_limit_bytes() as u64)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = match config.try_deserialize() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                return Err(if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    }
                } else if let config::ConfigError::NotFound(field) = &err {
                    ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    }
                } else if let config::ConfigError::Type { key: Some(key), .. } = &err {
                    ConfigError::InvalidValue {
                        env_var: to_env_var(key),
                        reason: error_str,
                    }
                } else {
                    ConfigError::Other(err)
                });
            }
        };

        if settings.mock.upload_limit_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                env_var: to_env_var("mock.upload_limit_bytes"),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(settings)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_chat_delay_ms() -> u64 {
    500
}

fn default_upload_delay_ms() -> u64 {
    2000
}

fn default_stream_chunk_delay_ms() -> u64 {
    25
}

fn default_upload_limit_bytes() -> usize {
    10 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("JUICI_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.mock.chat_delay_ms, 500);
        assert_eq!(settings.mock.upload_delay_ms, 2000);
        assert_eq!(settings.mock.stream_chunk_delay_ms, 25);
        assert_eq!(settings.mock.upload_limit_bytes, 10 * 1024 * 1024);
        assert_eq!(settings.mock.to_mock_settings(), MockSettings::default());
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("JUICI_SERVER__PORT", "8080");
        env::set_var("JUICI_SERVER__HOST", "0.0.0.0");
        env::set_var("JUICI_MOCK__CHAT_DELAY_MS", "0");
        env::set_var("JUICI_MOCK__UPLOAD_DELAY_MS", "150");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.mock.chat_delay_ms, 0);
        assert_eq!(
            settings.mock.to_mock_settings().upload_delay,
            Duration::from_millis(150)
        );

        // Clean up
        env::remove_var("JUICI_SERVER__PORT");
        env::remove_var("JUICI_SERVER__HOST");
        env::remove_var("JUICI_MOCK__CHAT_DELAY_MS");
        env::remove_var("JUICI_MOCK__UPLOAD_DELAY_MS");
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_rejected() {
        clean_env();
        env::set_var("JUICI_SERVER__PORT", "not-a-port");

        assert!(Settings::new().is_err());

        env::remove_var("JUICI_SERVER__PORT");
    }

    #[test]
    #[serial]
    fn test_zero_upload_limit_is_rejected() {
        clean_env();
        env::set_var("JUICI_MOCK__UPLOAD_LIMIT_BYTES", "0");

        match Settings::new() {
            Err(ConfigError::InvalidValue { env_var, .. }) => {
                assert_eq!(env_var, "JUICI_MOCK__UPLOAD_LIMIT_BYTES");
            }
            other => panic!("Expected invalid value error, got {:?}", other),
        }

        env::remove_var("JUICI_MOCK__UPLOAD_LIMIT_BYTES");
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let addr = server_settings.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_socket_addr_rejects_hostname() {
        let server_settings = ServerSettings {
            host: "not a host".to_string(),
            port: 3000,
        };
        assert!(matches!(
            server_settings.socket_addr(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
