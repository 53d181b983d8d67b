use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::entities::{Entity, EntityId, EntityRef, Kind};
use crate::instrumentation::observe_backend_call;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The backend answered with a non 2xx status. The body is ignored.
    #[error("Request failed with status code {0}")]
    Status(u16),
    #[error("Network Error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Cannot update a {0} that has no id")]
    MissingId(Kind),
}

/// Typed access to the `/api/<resource>` collections of the backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    api_root: String,
}

impl ApiClient {
    pub fn new(api_root: &str, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_root: api_root.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn collection_url(&self, kind: Kind) -> String {
        format!("{}/api/{}", self.api_root, kind.resource())
    }

    fn entity_url(&self, kind: Kind, id: EntityId) -> String {
        format!("{}/{}", self.collection_url(kind), id)
    }

    async fn send(
        &self,
        kind: Kind,
        method: Method,
        request: RequestBuilder,
    ) -> ClientResult<reqwest::Response> {
        let start = Instant::now();
        let result = request.send().await;
        let elapsed = start.elapsed().as_secs_f64();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                observe_backend_call(kind.resource(), method.as_str(), "error", elapsed);
                tracing::error!("{} {} failed: {}", method, kind.resource(), e);
                return Err(e.into());
            }
        };

        let status = response.status();
        observe_backend_call(kind.resource(), method.as_str(), status.as_str(), elapsed);
        if !status.is_success() {
            tracing::warn!("{} {} returned {}", method, kind.resource(), status);
            return Err(ClientError::Status(status.as_u16()));
        }

        Ok(response)
    }

    async fn fetch<R: DeserializeOwned>(
        &self,
        kind: Kind,
        method: Method,
        request: RequestBuilder,
    ) -> ClientResult<R> {
        let response = self.send(kind, method, request).await?;
        Ok(response.json::<R>().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list<T: Entity>(&self) -> ClientResult<Vec<T>> {
        let url = format!(
            "{}?cacheBuster={}",
            self.collection_url(T::KIND),
            chrono::Utc::now().timestamp_millis()
        );
        self.fetch(T::KIND, Method::GET, self.http.get(url)).await
    }

    /// Lists a collection without knowing its type, as needed to fill
    /// relationship dropdowns.
    #[tracing::instrument(skip(self))]
    pub async fn list_references(&self, kind: Kind) -> ClientResult<Vec<EntityRef>> {
        let url = format!(
            "{}?cacheBuster={}",
            self.collection_url(kind),
            chrono::Utc::now().timestamp_millis()
        );
        self.fetch(kind, Method::GET, self.http.get(url)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get<T: Entity>(&self, id: EntityId) -> ClientResult<T> {
        let url = self.entity_url(T::KIND, id);
        self.fetch(T::KIND, Method::GET, self.http.get(url)).await
    }

    #[tracing::instrument(skip_all)]
    pub async fn create<T: Entity>(&self, entity: &T) -> ClientResult<T> {
        let url = self.collection_url(T::KIND);
        self.fetch(T::KIND, Method::POST, self.http.post(url).json(entity))
            .await
    }

    #[tracing::instrument(skip_all, fields(id))]
    pub async fn update<T: Entity>(&self, entity: &T) -> ClientResult<T> {
        let id = entity.id().ok_or(ClientError::MissingId(T::KIND))?;
        tracing::Span::current().record("id", tracing::field::display(id));

        let url = self.entity_url(T::KIND, id);
        self.fetch(T::KIND, Method::PUT, self.http.put(url).json(entity))
            .await
    }

    #[tracing::instrument(skip_all, fields(id))]
    pub async fn partial_update<T: Entity>(&self, entity: &T) -> ClientResult<T> {
        let id = entity.id().ok_or(ClientError::MissingId(T::KIND))?;
        tracing::Span::current().record("id", tracing::field::display(id));

        let url = self.entity_url(T::KIND, id);
        let request = self
            .http
            .patch(url)
            .header(CONTENT_TYPE, "application/merge-patch+json")
            .json(entity);
        self.fetch(T::KIND, Method::PATCH, request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete<T: Entity>(&self, id: EntityId) -> ClientResult<()> {
        let url = self.entity_url(T::KIND, id);
        self.send(T::KIND, Method::DELETE, self.http.delete(url))
            .await?;

        Ok(())
    }

    /// Whether the backend's health endpoint answers with a success status.
    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> bool {
        let url = format!("{}/management/health", self.api_root);
        match self.http.get(url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                tracing::warn!("Backend health check failed: {}", e);
                false
            }
        }
    }
}
