use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{
    config::DEFAULT_TABLE,
    models::trip::{NewTrip, Trip, TripChanges, TripId},
    services::trips::{BackendError, TripStore},
};

struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Trip>,
}

/// In-process table with the PostgREST behaviours the router relies on:
/// sequential `bigint` ids, single-row reads that fail on no match and
/// not-null constraints on `destino`, `preco` and `tipo`.
#[derive(Clone)]
pub struct MemoryStore {
    table: Arc<str>,
    inner: Arc<RwLock<Table>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl MemoryStore {
    pub fn new(table: &str) -> Self {
        Self {
            table: Arc::from(table),
            inner: Arc::new(RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn not_null(&self, changes: &TripChanges) -> Result<(), BackendError> {
        let column = if changes.destino.is_none() {
            "destino"
        } else if changes.preco.is_none() {
            "preco"
        } else if changes.tipo.is_none() {
            "tipo"
        } else {
            return Ok(());
        };
        Err(BackendError::new(format!(
            "null value in column \"{column}\" of relation \"{}\" violates not-null constraint",
            self.table
        ))
        .with_code("23502"))
    }
}

fn parse_id(id: &str) -> Result<i64, BackendError> {
    id.parse().map_err(|_| {
        BackendError::new(format!("invalid input syntax for type bigint: \"{id}\"")).with_code("22P02")
    })
}

#[async_trait]
impl TripStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Trip>, BackendError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn list_by_tipo(&self, tipo: &str) -> Result<Vec<Trip>, BackendError> {
        let table = self.inner.read().await;
        Ok(table
            .rows
            .values()
            .filter(|trip| trip.tipo() == Some(tipo))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Trip, BackendError> {
        let id = parse_id(id)?;
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                BackendError::new("JSON object requested, multiple (or no) rows returned")
                    .with_code("PGRST116")
                    .with_details("The result contains 0 rows")
            })
    }

    async fn insert(&self, trip: NewTrip) -> Result<Vec<Trip>, BackendError> {
        let mut table = self.inner.write().await;
        let id = table.next_id;
        table.next_id += 1;
        let row = Trip {
            id: TripId::Number(id),
            destino: Some(Value::String(trip.destino)),
            duracao_dias: trip.duracao_dias.map(Value::from),
            preco: Some(Value::Number(trip.preco)),
            tipo: Some(Value::String(trip.tipo)),
            extra: Map::new(),
        };
        table.rows.insert(id, row.clone());
        Ok(vec![row])
    }

    async fn update(&self, id: &str, changes: TripChanges) -> Result<Vec<Trip>, BackendError> {
        let id = parse_id(id)?;
        let mut table = self.inner.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(Vec::new());
        };
        self.not_null(&changes)?;
        row.destino = changes.destino.map(Value::String);
        row.duracao_dias = changes.duracao_dias.map(Value::from);
        row.preco = changes.preco.map(Value::Number);
        row.tipo = changes.tipo.map(Value::String);
        Ok(vec![row.clone()])
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let id = parse_id(id)?;
        self.inner.write().await.rows.remove(&id);
        Ok(())
    }
}
