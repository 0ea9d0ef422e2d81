use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub iam: IamConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let iam = IamConfig {
            base_url: env::var("IAM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            app_id: env::var("IAM_APP_ID").unwrap_or_default(),
            control_app_id: env::var("IAM_CONTROL_APP_ID").ok(),
            timeout_seconds: parse_env_u64("IAM_TIMEOUT_SECONDS", 10)?,
            service_token: non_empty(env::var("IAM_SERVICE_TOKEN").ok()),
            service_user: non_empty(env::var("IAM_SERVICE_USER").ok()),
            service_password: non_empty(env::var("IAM_SERVICE_PASSWORD").ok()),
            recruiter_role_name: env::var("IAM_RECRUITER_ROLE_NAME")
                .unwrap_or_else(|_| "recruiter".to_string()),
        };

        let auth = AuthConfig {
            cookie_name: env::var("STAFFLINK_ACCESS_TOKEN_COOKIE_NAME")
                .unwrap_or_else(|_| "stafflink_access_token".to_string()),
            cookie_secure: parse_env_bool("STAFFLINK_ACCESS_TOKEN_COOKIE_SECURE", false)?,
            cookie_path: env::var("STAFFLINK_ACCESS_TOKEN_COOKIE_PATH")
                .unwrap_or_else(|_| "/".to_string()),
            allow_debug_headers: parse_env_bool(
                "STAFFLINK_ALLOW_DEBUG_HEADERS",
                environment != AppEnvironment::Production,
            )?,
        };

        let uploads = UploadConfig {
            max_size_bytes: parse_env_u64("STAFFLINK_UPLOAD_MAX_SIZE_BYTES", 5 * 1024 * 1024)?,
            allowed_extensions: env::var("STAFFLINK_ALLOWED_UPLOAD_EXTENSIONS")
                .map(|raw| {
                    raw.split(',')
                        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                        .filter(|ext| !ext.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| {
                    ["pdf", "jpg", "jpeg", "png"]
                        .iter()
                        .map(|ext| ext.to_string())
                        .collect()
                }),
        };

        let storage = StorageConfig {
            backend: StorageBackendKind::from_str(
                &env::var("STAFFLINK_STORAGE_BACKEND").unwrap_or_else(|_| "local".to_string()),
            )?,
            base_path: env::var("STAFFLINK_STORAGE_BASE_PATH")
                .unwrap_or_else(|_| "var/storage".to_string()),
            bucket: non_empty(env::var("STAFFLINK_STORAGE_BUCKET").ok()),
        };

        let export = ExportConfig {
            output_dir: env::var("STAFFLINK_EXPORT_OUTPUT_DIR")
                .unwrap_or_else(|_| storage.base_path.clone()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            iam,
            auth,
            uploads,
            storage,
            export,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection settings for the upstream IAM service.
#[derive(Debug, Clone)]
pub struct IamConfig {
    pub base_url: String,
    pub app_id: String,
    /// App id used when logging in with the service account; defaults to `app_id`.
    pub control_app_id: Option<String>,
    pub timeout_seconds: u64,
    pub service_token: Option<String>,
    pub service_user: Option<String>,
    pub service_password: Option<String>,
    pub recruiter_role_name: String,
}

impl IamConfig {
    pub fn control_app_id(&self) -> &str {
        self.control_app_id.as_deref().unwrap_or(&self.app_id)
    }
}

/// Access-token cookie and debug-header switches.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_path: String,
    pub allow_debug_headers: bool,
}

/// Limits applied to public document uploads.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

/// File storage backend selection.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    pub base_path: String,
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    Local,
    Cloud,
}

impl StorageBackendKind {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "cloud" | "s3" => Ok(Self::Cloud),
            other => Err(ConfigError::UnknownStorageBackend {
                value: other.to_string(),
            }),
        }
    }
}

/// Destination directory for generated Smart batches.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub output_dir: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                key: key.to_string(),
            }),
        },
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: String },
    InvalidBool { key: String },
    UnknownStorageBackend { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
            ConfigError::InvalidBool { key } => {
                write!(f, "{key} must be a boolean flag")
            }
            ConfigError::UnknownStorageBackend { value } => {
                write!(f, "unknown storage backend '{value}' (expected local or cloud)")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "IAM_BASE_URL",
            "IAM_APP_ID",
            "IAM_CONTROL_APP_ID",
            "IAM_TIMEOUT_SECONDS",
            "IAM_SERVICE_TOKEN",
            "IAM_SERVICE_USER",
            "IAM_SERVICE_PASSWORD",
            "STAFFLINK_ALLOW_DEBUG_HEADERS",
            "STAFFLINK_UPLOAD_MAX_SIZE_BYTES",
            "STAFFLINK_ALLOWED_UPLOAD_EXTENSIONS",
            "STAFFLINK_STORAGE_BACKEND",
            "STAFFLINK_STORAGE_BASE_PATH",
            "STAFFLINK_EXPORT_OUTPUT_DIR",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.iam.timeout_seconds, 10);
        assert!(config.auth.allow_debug_headers);
        assert_eq!(config.storage.backend, StorageBackendKind::Local);
        assert_eq!(config.export.output_dir, config.storage.base_path);
    }

    #[test]
    fn production_disables_debug_headers_by_default() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        let config = AppConfig::load().expect("config loads");
        assert!(!config.auth.allow_debug_headers);
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_unknown_storage_backend() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("STAFFLINK_STORAGE_BACKEND", "ftp");
        let err = AppConfig::load().expect_err("backend rejected");
        assert!(matches!(err, ConfigError::UnknownStorageBackend { .. }));
        reset_env();
    }
}
