//! Minimal PostgREST client.
//!
//! Every request carries the service key both as `apikey` and as a bearer
//! token. Failures come back as `DomainError` with `ExternalServiceError`.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

/// PostgREST endpoint and credentials.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    service_key: SecretString,
    http_client: reqwest::Client,
}

impl SupabaseClient {
    /// Creates a client for the project at `base_url` (e.g. `https://xyz.supabase.co`).
    pub fn new(
        base_url: impl Into<String>,
        service_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| external(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key,
            http_client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let key = self.service_key.expose_secret();
        self.http_client
            .request(method, format!("{}/rest/v1/{}", self.base_url, path))
            .header("apikey", key.as_str())
            .bearer_auth(key)
    }

    /// `GET /rest/v1/{table}` with PostgREST filters.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, DomainError> {
        let response = self
            .request(Method::GET, table)
            .query(filters)
            .send()
            .await
            .map_err(|e| external(format!("GET {} failed: {}", table, e)))?;

        parse(table, response).await
    }

    /// `POST /rest/v1/{table}` inserting one row.
    pub async fn insert<B: Serialize + ?Sized>(&self, table: &str, row: &B) -> Result<(), DomainError> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| external(format!("POST {} failed: {}", table, e)))?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(DomainError::validation(table, "Row already exists"));
        }
        check(table, response).await.map(|_| ())
    }

    /// `PATCH /rest/v1/{table}`; returns the updated rows.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        patch: &B,
    ) -> Result<Vec<T>, DomainError> {
        let response = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .query(filters)
            .json(patch)
            .send()
            .await
            .map_err(|e| external(format!("PATCH {} failed: {}", table, e)))?;

        parse(table, response).await
    }

    /// `POST /rest/v1/rpc/{function}`.
    pub async fn rpc<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        function: &str,
        args: &B,
    ) -> Result<T, DomainError> {
        let path = format!("rpc/{}", function);
        let response = self
            .request(Method::POST, &path)
            .json(args)
            .send()
            .await
            .map_err(|e| external(format!("RPC {} failed: {}", function, e)))?;

        parse(&path, response).await
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

fn external(message: String) -> DomainError {
    DomainError::new(ErrorCode::ExternalServiceError, message)
}

async fn check(path: &str, response: Response) -> Result<Response, DomainError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    tracing::error!(path, %status, error = %error_text, "PostgREST request failed");
    Err(external(format!("{} returned {}: {}", path, status, error_text)))
}

async fn parse<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, DomainError> {
    check(path, response)
        .await?
        .json()
        .await
        .map_err(|e| external(format!("Failed to parse {} response: {}", path, e)))
}
