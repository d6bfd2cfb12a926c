use std::{
    env,
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use url::Url;

use crate::error::AppError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TABLE: &str = "viagens";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Supabase,
    Memory,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(Self::Supabase),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Config(format!(
                "unknown VIAGENS_BACKEND `{other}` (expected `supabase` or `memory`)"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub backend: BackendKind,
    pub supabase: Option<SupabaseConfig>,
    pub table: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|err| AppError::Config(format!("invalid PORT: {err}")))?,
            None => DEFAULT_PORT,
        };
        let host: IpAddr = var("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .trim()
            .parse()
            .map_err(|err| AppError::Config(format!("invalid HOST: {err}")))?;

        let backend = match var("VIAGENS_BACKEND") {
            Some(raw) => raw.parse()?,
            None => BackendKind::Supabase,
        };

        let supabase = match backend {
            BackendKind::Supabase => {
                let raw_url = var("SUPABASE_URL")
                    .ok_or_else(|| AppError::Config("SUPABASE_URL is not set".into()))?;
                let url = Url::parse(raw_url.trim())
                    .map_err(|err| AppError::Config(format!("invalid SUPABASE_URL: {err}")))?;
                let key = var("SUPABASE_KEY")
                    .ok_or_else(|| AppError::Config("SUPABASE_KEY is not set".into()))?;
                Some(SupabaseConfig { url, key })
            }
            BackendKind::Memory => None,
        };

        let table = var("SUPABASE_TABLE")
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            backend,
            supabase,
            table,
        })
    }
}
