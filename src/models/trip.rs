use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::AppError;

pub const MISSING_FIELDS_MESSAGE: &str = "Destino, preço e tipo são obrigatórios.";

/// Backend-assigned row identifier. Supabase tables commonly use `bigint`
/// identity columns, but `uuid` keys arrive as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TripId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripId::Number(id) => write!(f, "{id}"),
            TripId::Text(id) => f.write_str(id),
        }
    }
}

/// A row of the `viagens` table as the backend returns it. Column values are
/// kept as raw JSON so rows are forwarded exactly as the backend typed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub destino: Option<Value>,
    pub duracao_dias: Option<Value>,
    pub preco: Option<Value>,
    pub tipo: Option<Value>,
    /// Columns this crate does not model (`created_at`, ...), passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trip {
    pub fn destino(&self) -> Option<&str> {
        self.destino.as_ref().and_then(Value::as_str)
    }

    pub fn tipo(&self) -> Option<&str> {
        self.tipo.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripPayload {
    pub destino: Option<String>,
    pub duracao_dias: Option<i64>,
    pub preco: Option<Number>,
    pub tipo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTrip {
    pub destino: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duracao_dias: Option<i64>,
    pub preco: Number,
    pub tipo: String,
}

/// Full-row replacement: absent fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripChanges {
    pub destino: Option<String>,
    pub duracao_dias: Option<i64>,
    pub preco: Option<Number>,
    pub tipo: Option<String>,
}

impl TripPayload {
    pub fn into_new_trip(self) -> Result<NewTrip, AppError> {
        let destino = self.destino.filter(|value| !value.is_empty());
        let tipo = self.tipo.filter(|value| !value.is_empty());
        let preco = self.preco.filter(|value| !is_zero(value));

        match (destino, preco, tipo) {
            (Some(destino), Some(preco), Some(tipo)) => Ok(NewTrip {
                destino,
                duracao_dias: self.duracao_dias,
                preco,
                tipo,
            }),
            _ => Err(AppError::BadRequest(MISSING_FIELDS_MESSAGE.into())),
        }
    }

    pub fn into_changes(self) -> TripChanges {
        TripChanges {
            destino: self.destino,
            duracao_dias: self.duracao_dias,
            preco: self.preco,
            tipo: self.tipo,
        }
    }
}

fn is_zero(number: &Number) -> bool {
    number.as_f64().map(|value| value == 0.0).unwrap_or(false)
}
