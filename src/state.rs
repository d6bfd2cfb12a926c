use std::sync::Arc;

use crate::{
    config::{AppConfig, BackendKind},
    error::AppError,
    services::{memory::MemoryStore, supabase::SupabaseStore, trips::DynTripStore},
};

#[derive(Clone)]
pub struct AppState {
    pub trips: DynTripStore,
}

impl AppState {
    pub fn new(trips: DynTripStore) -> Self {
        Self { trips }
    }

    /// Builds the table client selected by `config.backend`.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let trips: DynTripStore = match config.backend {
            BackendKind::Supabase => {
                let supabase = config.supabase.as_ref().ok_or_else(|| {
                    AppError::Config("supabase backend selected without credentials".into())
                })?;
                Arc::new(SupabaseStore::new(supabase, &config.table)?)
            }
            BackendKind::Memory => Arc::new(MemoryStore::new(&config.table)),
        };
        Ok(Self::new(trips))
    }
}
