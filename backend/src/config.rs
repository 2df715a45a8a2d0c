use std::env;
use dotenv::dotenv;
use serde::Deserialize;
use log::{info, warn};
use shared::datasource::{CollectionNames, ConnectionSettings};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub data_source: DataSourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceConfig {
    /// Initial connection settings; replaceable at runtime
    pub settings: ConnectionSettings,
    pub collections: CollectionNames,
    pub timeout_seconds: u64,
}

fn required(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    env::var(name).map_err(|_| format!("{} must be set in production", name).into())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    fn parse_backend_url(url: &str) -> (String, u16) {
        // Parse BACKEND_URL like "http://localhost:50002" or "http://127.0.0.1:50002"
        if let Ok(parsed_url) = url::Url::parse(url) {
            let host = parsed_url.host_str().unwrap_or("127.0.0.1").to_string();
            let port = parsed_url.port().unwrap_or(50002);
            (host, port)
        } else {
            ("127.0.0.1".to_string(), 50002)
        }
    }

    fn load_env_files() {
        match env::var("ENV_FILE_PATH") {
            Ok(env_file_path) if !env_file_path.is_empty() => {
                info!("Loading environment from ENV_FILE_PATH: {}", env_file_path);
                dotenv::from_filename(&env_file_path).ok();
            }
            _ => {
                dotenv().ok();
                // .env.<env> overrides .env for anything but development
                let environment_hint = env::var("RUST_ENV")
                    .unwrap_or_else(|_| "development".to_string())
                    .parse()
                    .unwrap_or(Environment::Development);
                let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
                if env_file != ".env.development" {
                    let _ = dotenv::from_filename(&env_file);
                }
            }
        }
    }

    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_env_files();

        let environment = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);

        info!("Loading configuration for environment: {:?}", environment);

        let config = Config {
            environment: environment.clone(),
            server: Self::load_server_config(&environment),
            data_source: Self::load_data_source_config(&environment)?,
        };

        config.validate()?;
        config.log_configuration();

        Ok(config)
    }

    fn load_server_config(env: &Environment) -> ServerConfig {
        let backend_url = env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://0.0.0.0:50002".to_string());
        let (host, port) = Self::parse_backend_url(&backend_url);
        let default_workers = match env {
            Environment::Production => 8,
            Environment::Development | Environment::Test => 1,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        ServerConfig {
            // SERVER_HOST takes precedence over the BACKEND_URL host
            host: env::var("SERVER_HOST").unwrap_or(host),
            port: parsed_or("SERVER_PORT", port),
            workers: parsed_or("BACKEND_WORKERS", default_workers),
            cors_origins,
        }
    }

    fn load_data_source_config(env: &Environment) -> Result<DataSourceConfig, Box<dyn std::error::Error>> {
        let settings = match env {
            Environment::Production => ConnectionSettings {
                url: required("SURREAL_URL")?,
                namespace: required("SURREAL_NAMESPACE")?,
                database: required("SURREAL_DATABASE")?,
                username: required("SURREAL_USERNAME")?,
                password: required("SURREAL_PASSWORD")?,
            },
            Environment::Development | Environment::Test => {
                let surreal_url = env::var("SURREAL_URL");
                match &surreal_url {
                    Ok(url) => info!("Found SURREAL_URL in environment: {}", url),
                    Err(_) => warn!("SURREAL_URL not found in environment, using default"),
                }
                let default_database = if *env == Environment::Test { "test" } else { "dev" };

                ConnectionSettings {
                    url: surreal_url.unwrap_or_else(|_| "http://localhost:8000".to_string()),
                    namespace: env::var("SURREAL_NAMESPACE").unwrap_or_else(|_| "cards".to_string()),
                    database: env::var("SURREAL_DATABASE").unwrap_or_else(|_| default_database.to_string()),
                    username: env::var("SURREAL_USERNAME").unwrap_or_else(|_| "root".to_string()),
                    password: env::var("SURREAL_PASSWORD").unwrap_or_else(|_| "root".to_string()),
                }
            }
        };

        let defaults = CollectionNames::default();
        let collections = CollectionNames {
            players: env::var("PLAYERS_COLLECTION").unwrap_or(defaults.players),
            matches: env::var("MATCHES_COLLECTION").unwrap_or(defaults.matches),
            users: env::var("USERS_COLLECTION").unwrap_or(defaults.users),
        };

        Ok(DataSourceConfig {
            settings,
            collections,
            timeout_seconds: parsed_or("SURREAL_TIMEOUT", 30),
        })
    }

    pub(crate) fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.environment == Environment::Production && self.data_source.settings.password == "root" {
            return Err("Production database password cannot be 'root'".into());
        }

        if self.server.port == 0 {
            return Err("Server port cannot be 0".into());
        }

        if self.data_source.timeout_seconds == 0 {
            return Err("Data source timeout cannot be 0".into());
        }

        self.data_source
            .settings
            .validate()
            .map_err(|e| format!("Invalid connection settings: {}", e))?;

        let names = &self.data_source.collections;
        if names.players.is_empty() || names.matches.is_empty() || names.users.is_empty() {
            return Err("Collection names cannot be empty".into());
        }

        Ok(())
    }

    fn log_configuration(&self) {
        let settings = &self.data_source.settings;
        info!("Configuration loaded successfully");
        info!("Environment: {:?}", self.environment);
        info!("Server: {}:{} (workers: {})", self.server.host, self.server.port, self.server.workers);
        info!(
            "Data source: {} ns={} db={} user={} (timeout: {}s)",
            settings.url, settings.namespace, settings.database, settings.username, self.data_source.timeout_seconds
        );
        info!(
            "Collections: players={} matches={} users={}",
            self.data_source.collections.players,
            self.data_source.collections.matches,
            self.data_source.collections.users
        );

        if self.environment == Environment::Development {
            warn!("Running in development mode with default credentials");
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
