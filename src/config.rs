use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 远端业务服务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            remote: RemoteConfig {
                base_url: "http://10.0.10.46/api/r/v1".to_string(),
                timeout_secs: 30,
            },
        }
    }
}

impl AppConfig {
    /// 默认值之上叠加 `LONGBILL_` 前缀环境变量，例如 `LONGBILL_REMOTE__BASE_URL`
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("remote.base_url", defaults.remote.base_url)?
            .set_default("remote.timeout_secs", defaults.remote.timeout_secs as i64)?
            .add_source(
                config::Environment::with_prefix("LONGBILL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
