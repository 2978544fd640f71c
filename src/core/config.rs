use std::env;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub storage: MediaStorageConfig,
    pub speech: SpeechConfig,
    pub vision: VisionConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Local-disk storage for uploaded media blobs
#[derive(Debug, Clone)]
pub struct MediaStorageConfig {
    /// Directory media files are written to (created on demand)
    pub root: String,
}

/// OpenAI Whisper transcription configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// API key; transcription fails fast when unset
    pub api_key: Option<String>,
    pub api_base: String,
    /// Primary language hint passed to Whisper
    pub language: String,
}

/// Google Cloud Vision configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// API key; image/document OCR fails fast when unset
    pub api_key: Option<String>,
    pub api_base: String,
}

/// Extraction worker pool sizing
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            storage: MediaStorageConfig::from_env()?,
            speech: SpeechConfig::from_env()?,
            vision: VisionConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }

    pub fn workers(&self) -> Result<WorkerConfig, String> {
        WorkerConfig::from_env()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }

    /// Build the connection pool this config describes
    pub async fn connect_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
            .connect(&self.url)
            .await
    }
}

impl MediaStorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let root = env::var("MEDIA_STORAGE_PATH").unwrap_or_else(|_| "./uploads".to_string());
        Ok(Self { root })
    }
}

impl SpeechConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty());
        if api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; audio transcription will fail");
        }

        let api_base =
            env::var("OPENAI_API_BASE").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let language = env::var("SPEECH_LANGUAGE").unwrap_or_else(|_| "de".to_string());

        Ok(Self {
            api_key,
            api_base,
            language,
        })
    }
}

impl VisionConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("GOOGLE_VISION_API_KEY")
            .ok()
            .filter(|s| !s.is_empty());
        if api_key.is_none() {
            tracing::warn!("GOOGLE_VISION_API_KEY is not set; image and document OCR will fail");
        }

        let api_base = env::var("GOOGLE_VISION_API_BASE")
            .unwrap_or_else(|_| "https://vision.googleapis.com/v1".to_string());

        Ok(Self { api_key, api_base })
    }
}

impl WorkerConfig {
    const DEFAULT_WORKERS: usize = 4;
    const DEFAULT_QUEUE_CAPACITY: usize = 64;

    pub fn from_env() -> Result<Self, String> {
        let workers = env::var("EXTRACTION_WORKERS")
            .unwrap_or_else(|_| Self::DEFAULT_WORKERS.to_string())
            .parse::<usize>()
            .map_err(|_| "EXTRACTION_WORKERS must be a valid number".to_string())?;
        if workers == 0 {
            return Err("EXTRACTION_WORKERS must be at least 1".to_string());
        }

        let queue_capacity = env::var("EXTRACTION_QUEUE_CAPACITY")
            .unwrap_or_else(|_| Self::DEFAULT_QUEUE_CAPACITY.to_string())
            .parse::<usize>()
            .map_err(|_| "EXTRACTION_QUEUE_CAPACITY must be a valid number".to_string())?;
        if queue_capacity == 0 {
            return Err("EXTRACTION_QUEUE_CAPACITY must be at least 1".to_string());
        }

        Ok(Self {
            workers,
            queue_capacity,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Merkzettel API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for Merkzettel".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
