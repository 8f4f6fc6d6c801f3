//! Configuración de variables de entorno
//!
//! La configuración se construye una sola vez al arrancar: valores por defecto,
//! después un fichero YAML opcional y por último las variables de entorno.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use super::database::DatabaseConfig;

/// Ruta por defecto del fichero de configuración
pub const DEFAULT_CONFIG_FILE: &str = "config/config.yaml";

/// Configuración del entorno
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub bcrypt_cost: u32,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_secs: u64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiration_secs: 86_400,
            issuer: "parking_system".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Credenciales del administrador creado al arrancar
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

impl AdminConfig {
    /// Devuelve (username, password, email) solo si los tres están definidos
    pub fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (&self.username, &self.password, &self.email) {
            (Some(u), Some(p), Some(e)) if !u.is_empty() && !p.is_empty() && !e.is_empty() => {
                Some((u.as_str(), p.as_str(), e.as_str()))
            }
            _ => None,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            database: DatabaseConfig::default(),
            jwt: JwtConfig::default(),
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            logging: LoggingConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Cargar la configuración completa: defaults, YAML y entorno
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Leer el fichero YAML si existe; si no, usar los valores por defecto
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Aplicar variables de entorno sobre la configuración cargada
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ENVIRONMENT") {
            self.environment = v;
        }
        if let Some(v) = lookup("HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Some(v) = lookup("JWT_EXPIRATION") {
            self.jwt.expiration_secs = parse_var("JWT_EXPIRATION", &v)?;
        }
        if let Some(v) = lookup("JWT_ISSUER") {
            self.jwt.issuer = v;
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("BCRYPT_COST") {
            self.bcrypt_cost = parse_var("BCRYPT_COST", &v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.logging.level = v;
        }
        if let Some(v) = lookup("LOG_FILE") {
            self.logging.file = Some(v);
        }
        if let Some(v) = lookup("ADMIN_USERNAME") {
            self.admin.username = Some(v);
        }
        if let Some(v) = lookup("ADMIN_PASSWORD") {
            self.admin.password = Some(v);
        }
        if let Some(v) = lookup("ADMIN_EMAIL") {
            self.admin.email = Some(v);
        }
        Ok(())
    }

    /// Comprobar los valores obligatorios
    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            bail!("DATABASE_URL must be set");
        }
        if self.jwt.secret.is_empty() {
            bail!("JWT_SECRET must be set");
        }
        if self.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a valid number, got '{}'", name, value))
}
