//! PostgREST-style backend over HTTPS.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{Backend, ChangeFeed, Record, realtime};
use crate::config::Config;
use crate::error::{BackendError, BackendResult, ConfigResult};
use crate::model::Table;

/// Authenticated HTTP access to the hosted project.
///
/// Shared by the REST tables and the storage API.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    base: String,
    api_key: String,
}

impl ServiceClient {
    /// Client for the project at `base` using the anonymous `api_key`.
    pub fn new(base: &Url, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Client from the `backend` config section.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        Ok(Self::new(&config.backend_url()?, config.backend_api_key()?))
    }

    /// Project base URL, without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Anonymous API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Request to `{base}/{path}` carrying the `apikey` and bearer headers.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base, path.trim_start_matches('/')))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send `request`, mapping non-success statuses to [`BackendError::Status`].
    pub async fn send(request: RequestBuilder) -> BackendResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "error", alias = "msg")]
    message: String,
}

/// Pull the human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// REST tables plus the realtime change feed.
#[derive(Debug, Clone)]
pub struct RestBackend {
    service: ServiceClient,
    reconnect_delay: Duration,
}

impl RestBackend {
    /// Backend over `service`.
    pub const fn new(service: ServiceClient) -> Self {
        Self {
            service,
            reconnect_delay: realtime::DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Backend from the `backend` config section.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        Ok(Self::new(ServiceClient::from_config(config)?))
    }

    /// Delay before the realtime feed reconnects.
    #[must_use]
    pub const fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// The underlying HTTP client.
    pub const fn service(&self) -> &ServiceClient {
        &self.service
    }

    fn table(&self, method: Method, table: Table) -> RequestBuilder {
        self.service.request(method, &format!("rest/v1/{table}"))
    }

    /// Run a filtered write that must touch at least one row.
    async fn write_one(&self, table: Table, id: &str, request: RequestBuilder) -> BackendResult<()> {
        let request = request
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation");
        let touched: Vec<Value> = ServiceClient::send(request).await?.json().await?;
        if touched.is_empty() {
            return Err(BackendError::NotFound {
                table: table.name(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl Backend for RestBackend {
    #[tracing::instrument(skip(self), fields(table = %R::TABLE))]
    async fn fetch_all<R: Record>(&self) -> BackendResult<Vec<R>> {
        let request = self
            .table(Method::GET, R::TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows: Vec<R> = ServiceClient::send(request).await?.json().await?;
        tracing::debug!(rows = rows.len(), "fetched");
        Ok(rows)
    }

    #[tracing::instrument(skip_all, fields(table = %R::TABLE))]
    async fn insert<R: Record>(&self, row: &R::New) -> BackendResult<()> {
        let request = self
            .table(Method::POST, R::TABLE)
            .header("Prefer", "return=minimal")
            .json(&[row]);
        ServiceClient::send(request).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, patch), fields(table = %R::TABLE))]
    async fn update<R: Record>(&self, id: &str, patch: &R::Patch) -> BackendResult<()> {
        let request = self.table(Method::PATCH, R::TABLE).json(patch);
        self.write_one(R::TABLE, id, request).await
    }

    #[tracing::instrument(skip(self), fields(table = %R::TABLE))]
    async fn delete<R: Record>(&self, id: &str) -> BackendResult<()> {
        let request = self.table(Method::DELETE, R::TABLE);
        self.write_one(R::TABLE, id, request).await
    }

    fn subscribe(&self, table: Table) -> ChangeFeed {
        realtime::spawn_feed(
            self.service.base(),
            self.service.api_key(),
            table,
            self.reconnect_delay,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"message":"permission denied","code":"42501"}"#),
            "permission denied"
        );
        assert_eq!(error_message(r#"{"error":"Bucket not found"}"#), "Bucket not found");
        assert_eq!(error_message("  plain failure \n"), "plain failure");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let url = Url::parse("https://abc.supabase.co/").unwrap();
        let service = ServiceClient::new(&url, "anon");
        assert_eq!(service.base(), "https://abc.supabase.co");
        assert_eq!(service.api_key(), "anon");
    }

    #[test]
    fn from_config_requires_backend_settings() {
        let mut config = Config::default();
        assert!(RestBackend::from_config(&config).is_err());

        config.backend.url = Some("https://abc.supabase.co".into());
        config.backend.api_key = Some("anon".into());
        let backend = RestBackend::from_config(&config).unwrap();
        assert_eq!(backend.service().base(), "https://abc.supabase.co");
    }

    #[test]
    fn table_requests_target_rest_path() {
        let url = Url::parse("https://abc.supabase.co").unwrap();
        let backend = RestBackend::new(ServiceClient::new(&url, "anon"));
        let request = backend
            .table(Method::GET, Table::Posts)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://abc.supabase.co/rest/v1/posts?select=*&order=created_at.desc"
        );
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["authorization"], "Bearer anon");
    }
}
