use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Empty string selects the in-memory store (local development only).
    pub mongo_uri: String,
    pub mongo_database: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub object_storage: Option<ObjectStorageSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStorageSettings {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| {
                eprintln!("WARNING: MONGO_URI not set, using in-memory game store (dev only)");
                String::new()
            });

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "gameforge".to_string());

        let jwt_secret = settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| {
                if app_env == "prod" {
                    panic!("FATAL: JWT_SECRET must be set in production!");
                }
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            });

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let object_storage = match settings.get::<ObjectStorageSettings>("object_storage") {
            Ok(storage) => Some(storage),
            Err(_) => Self::object_storage_from_env(),
        };

        Ok(Config {
            mongo_uri,
            mongo_database,
            jwt_secret,
            bind_addr,
            object_storage,
        })
    }

    fn object_storage_from_env() -> Option<ObjectStorageSettings> {
        let bucket = env::var("STORAGE_BUCKET").ok()?;
        let access_key = env::var("STORAGE_ACCESS_KEY").ok()?;
        let secret_key = env::var("STORAGE_SECRET_KEY").ok()?;

        Some(ObjectStorageSettings {
            bucket,
            region: env::var("STORAGE_REGION").unwrap_or_else(|_| "ru-central1".to_string()),
            endpoint: env::var("STORAGE_ENDPOINT").ok(),
            access_key,
            secret_key,
        })
    }
}
