use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use wardgate_application::{DEFAULT_PAGE_SIZE, DoctorIdentity, MAX_LIST_LIMIT, QueryBuilder};
use wardgate_core::AppError;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub hospital_schema: String,
    pub dashboard_page_size: u32,
    pub doctor_identity: DoctorIdentity,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::InvalidInput("DATABASE_URL is required".to_owned()))?;

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10_u32)?;
        if database_max_connections == 0 {
            return Err(AppError::InvalidInput(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_owned(),
            ));
        }

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or(&lookup, "API_PORT", 3001_u16)?;
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let hospital_schema =
            lookup("HOSPITAL_SCHEMA").unwrap_or_else(|| "hospital_db".to_owned());
        QueryBuilder::new(hospital_schema.as_str())?;

        let dashboard_page_size = parse_or(&lookup, "DASHBOARD_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if dashboard_page_size == 0 || dashboard_page_size > MAX_LIST_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "DASHBOARD_PAGE_SIZE must be between 1 and {MAX_LIST_LIMIT}"
            )));
        }

        let doctor_identity = lookup("DOCTOR_IDENTITY")
            .map(|value| DoctorIdentity::from_str(value.as_str()))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            database_url,
            database_max_connections,
            api_host,
            api_port,
            frontend_url,
            cookie_secure,
            hospital_schema,
            dashboard_page_size,
            doctor_identity,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::InvalidInput(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}
