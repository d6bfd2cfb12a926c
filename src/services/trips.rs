use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::trip::{NewTrip, Trip, TripChanges};

/// Error reported by the table backend. Mirrors the PostgREST error body so
/// the message can be forwarded to clients untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::new(err.to_string())
    }
}

/// One method per table operation. `id` values are forwarded as the client
/// sent them; the backend decides whether they are valid.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Trip>, BackendError>;
    async fn list_by_tipo(&self, tipo: &str) -> Result<Vec<Trip>, BackendError>;
    async fn get(&self, id: &str) -> Result<Trip, BackendError>;
    async fn insert(&self, trip: NewTrip) -> Result<Vec<Trip>, BackendError>;
    async fn update(&self, id: &str, changes: TripChanges) -> Result<Vec<Trip>, BackendError>;
    async fn delete(&self, id: &str) -> Result<(), BackendError>;
}

pub type DynTripStore = Arc<dyn TripStore>;
