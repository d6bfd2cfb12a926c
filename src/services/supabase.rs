use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION},
    RequestBuilder, Response, StatusCode,
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::SupabaseConfig,
    error::AppError,
    models::trip::{NewTrip, Trip, TripChanges},
    services::trips::{BackendError, TripStore},
};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Table client for a Supabase project, talking to its PostgREST endpoint.
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    endpoint: Arc<Url>,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig, table: &str) -> Result<Self, AppError> {
        let endpoint = rest_endpoint(&config.url, table)?;

        let invalid_key = |_: InvalidHeaderValue| {
            AppError::Config("SUPABASE_KEY is not a valid header value".into())
        };
        let mut apikey = HeaderValue::from_str(&config.key).map_err(invalid_key)?;
        apikey.set_sensitive(true);
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.key)).map_err(invalid_key)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| AppError::Other(err.into()))?;

        Ok(Self {
            client,
            endpoint: Arc::new(endpoint),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(|err| {
            warn!(error = %err, "supabase request could not be sent");
            BackendError::from(err)
        })?;
        let status = response.status();
        debug!(%status, "supabase responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = decode_error(status, &body);
        warn!(%status, code = ?err.code, message = %err.message, "supabase rejected request");
        Err(err)
    }

    fn select(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("select", "*")])
    }
}

#[async_trait]
impl TripStore for SupabaseStore {
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Trip>, BackendError> {
        let request = self.select(self.client.get(self.endpoint().clone()));
        Ok(self.send(request).await?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_tipo(&self, tipo: &str) -> Result<Vec<Trip>, BackendError> {
        let request = self
            .select(self.client.get(self.endpoint().clone()))
            .query(&[("tipo", eq(tipo))]);
        Ok(self.send(request).await?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Trip, BackendError> {
        let request = self
            .select(self.client.get(self.endpoint().clone()))
            .query(&[("id", eq(id))])
            .header(ACCEPT, SINGLE_OBJECT);
        Ok(self.send(request).await?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn insert(&self, trip: NewTrip) -> Result<Vec<Trip>, BackendError> {
        let request = self
            .select(self.client.post(self.endpoint().clone()))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[trip]);
        Ok(self.send(request).await?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, id: &str, changes: TripChanges) -> Result<Vec<Trip>, BackendError> {
        let request = self
            .select(self.client.patch(self.endpoint().clone()))
            .query(&[("id", eq(id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&changes);
        Ok(self.send(request).await?.json().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let request = self
            .client
            .delete(self.endpoint().clone())
            .query(&[("id", eq(id))]);
        self.send(request).await?;
        Ok(())
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

fn rest_endpoint(base: &Url, table: &str) -> Result<Url, AppError> {
    let mut endpoint = base.clone();
    endpoint.set_query(None);
    endpoint.set_fragment(None);
    endpoint
        .path_segments_mut()
        .map_err(|_| AppError::Config(format!("SUPABASE_URL cannot be used as a base: {base}")))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    Ok(endpoint)
}

fn decode_error(status: StatusCode, body: &str) -> BackendError {
    if let Ok(err) = serde_json::from_str::<BackendError>(body) {
        return err;
    }
    let text = body.trim();
    if text.is_empty() {
        BackendError::new(status.to_string())
    } else {
        BackendError::new(text)
    }
}
