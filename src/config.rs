use std::{env, net::IpAddr, str::FromStr};

use anyhow::{Context, anyhow, bail};
use rust_decimal::Decimal;

use crate::pricing::{PricingPolicy, ShippingPolicy, TaxPolicy};

const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const MIN_SESSION_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Database,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "database" | "db" => Ok(SessionBackend::Database),
            other => Err(anyhow!("SESSION_STORE must be memory or database, got {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    pub frontend_origin: Option<String>,
    pub admin_username: String,
    pub admin_password: String,
    pub pricing: PricingPolicy,
    pub max_body_bytes: usize,
    pub session_backend: SessionBackend,
    pub session_ttl_minutes: i64,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = parse_or(var("APP_HOST"), "APP_HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or(var("APP_PORT"), "APP_PORT", 8080_u16)?;
        let db_max_connections =
            parse_or(var("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 20_u32)?.clamp(1, 50);

        let admin_username = var("ADMIN_USERNAME")
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| "admin".to_string());
        let admin_password = match var("ADMIN_PASSWORD") {
            Some(password) => password.trim().to_string(),
            None => {
                tracing::warn!("ADMIN_PASSWORD is not set, the default admin password will be seeded");
                "nepkart2026".to_string()
            }
        };

        let shipping = match var("SHIPPING_POLICY") {
            Some(raw) => serde_json::from_str::<ShippingPolicy>(&raw)
                .context("SHIPPING_POLICY is not a recognized policy")?,
            None => ShippingPolicy::default(),
        };
        shipping.validate().map_err(|err| anyhow!("SHIPPING_POLICY: {err}"))?;

        let tax = match (var("TAX_POLICY"), var("TAX_RATE")) {
            (Some(raw), _) => serde_json::from_str::<TaxPolicy>(&raw)
                .context("TAX_POLICY is not a recognized policy")?,
            (None, Some(rate)) => TaxPolicy::Rate {
                rate: Decimal::from_str(rate.trim()).context("TAX_RATE is not a decimal")?,
            },
            (None, None) => TaxPolicy::default(),
        }
        .normalized();
        tax.validate().map_err(|err| anyhow!("TAX_POLICY: {err}"))?;

        let max_body_bytes = parse_or(var("MAX_BODY_BYTES"), "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?;
        if max_body_bytes == 0 {
            bail!("MAX_BODY_BYTES must be positive");
        }

        let session_backend = match var("SESSION_STORE") {
            Some(raw) => raw.parse()?,
            None => SessionBackend::Memory,
        };
        let session_ttl_minutes = parse_or(
            var("SESSION_TTL_MINUTES"),
            "SESSION_TTL_MINUTES",
            MIN_SESSION_TTL_MINUTES,
        )?
        .max(MIN_SESSION_TTL_MINUTES);
        let cookie_secure = parse_or(var("COOKIE_SECURE"), "COOKIE_SECURE", false)?;

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            frontend_origin: var("FRONTEND_ORIGIN").map(|origin| origin.trim().to_string()),
            admin_username,
            admin_password,
            pricing: PricingPolicy { shipping, tax },
            max_body_bytes,
            session_backend,
            session_ttl_minutes,
            cookie_secure,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|err| anyhow!("{key} is invalid: {err}")),
        None => Ok(default),
    }
}
