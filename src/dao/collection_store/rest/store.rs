use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::dao::{
    collection_store::{CollectionStore, PageEnvelope, PageQuery},
    models::EntityKind,
    storage::StorageResult,
};

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
};

/// [`CollectionStore`] backed by the upstream REST API. Every call is a single
/// attempt; failures surface to the caller unchanged.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl RestStore {
    /// Build the HTTP client and verify the backend answers.
    pub async fn connect(config: RestConfig) -> RestResult<Self> {
        let store = Self::new(config)?;
        store.ping().await?;
        Ok(store)
    }

    /// Build the HTTP client without contacting the backend.
    pub fn new(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder, path: &str) -> RestResult<reqwest::Response> {
        builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.to_string(),
                source,
            })
    }

    async fn decode<T>(response: reqwest::Response, path: &str) -> RestResult<T>
    where
        T: DeserializeOwned,
    {
        response
            .json::<T>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn ping(&self) -> RestResult<()> {
        let path = EntityKind::Clubs.collection();
        let response = self
            .send(
                self.request(Method::GET, path).query(&[("limit", "1"), ("page", "1")]),
                path,
            )
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            })
        }
    }

    async fn fetch_page(&self, kind: EntityKind, query: PageQuery) -> RestResult<PageEnvelope<Value>> {
        let path = kind.collection();
        debug!(collection = path, page = query.page, limit = query.limit, "fetching page");
        let response = self
            .send(self.request(Method::GET, path).query(&query), path)
            .await?;

        if !response.status().is_success() {
            return Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        Self::decode(response, path).await
    }

    async fn fetch_all(&self, kind: EntityKind) -> RestResult<Vec<Value>> {
        let path = kind.collection();
        let response = self.send(self.request(Method::GET, path), path).await?;

        if !response.status().is_success() {
            return Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        Self::decode(response, path).await
    }

    async fn fetch_one(&self, kind: EntityKind, id: &str) -> RestResult<Option<Value>> {
        let path = format!("{}/{}", kind.collection(), id);
        let response = self.send(self.request(Method::GET, &path), &path).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Self::decode(response, &path).await.map(Some),
            other => Err(RestDaoError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn post(&self, kind: EntityKind, body: &Value) -> RestResult<Value> {
        let path = kind.collection();
        let response = self
            .send(self.request(Method::POST, path).json(body), path)
            .await?;

        if response.status().is_success() {
            Self::decode(response, path).await
        } else {
            Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            })
        }
    }

    async fn patch(&self, kind: EntityKind, id: &str, body: &Value) -> RestResult<Option<Value>> {
        let path = format!("{}/{}", kind.collection(), id);
        let response = self
            .send(self.request(Method::PATCH, &path).json(body), &path)
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Self::decode(response, &path).await.map(Some),
            other => Err(RestDaoError::RequestStatus {
                path,
                status: other,
            }),
        }
    }

    async fn remove(&self, kind: EntityKind, id: &str) -> RestResult<bool> {
        let path = format!("{}/{}", kind.collection(), id);
        let response = self.send(self.request(Method::DELETE, &path), &path).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            other => Err(RestDaoError::RequestStatus {
                path,
                status: other,
            }),
        }
    }
}

impl CollectionStore for RestStore {
    fn backend_name(&self) -> &'static str {
        "rest"
    }

    fn list_page(
        &self,
        kind: EntityKind,
        query: PageQuery,
    ) -> BoxFuture<'static, StorageResult<PageEnvelope<Value>>> {
        let store = self.clone();
        Box::pin(async move { store.fetch_page(kind, query).await.map_err(Into::into) })
    }

    fn list_all(&self, kind: EntityKind) -> BoxFuture<'static, StorageResult<Vec<Value>>> {
        let store = self.clone();
        Box::pin(async move { store.fetch_all(kind).await.map_err(Into::into) })
    }

    fn find(
        &self,
        kind: EntityKind,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move { store.fetch_one(kind, &id).await.map_err(Into::into) })
    }

    fn create(&self, kind: EntityKind, body: Value) -> BoxFuture<'static, StorageResult<Value>> {
        let store = self.clone();
        Box::pin(async move { store.post(kind, &body).await.map_err(Into::into) })
    }

    fn update(
        &self,
        kind: EntityKind,
        id: String,
        body: Value,
    ) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move { store.patch(kind, &id, &body).await.map_err(Into::into) })
    }

    fn delete(&self, kind: EntityKind, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.remove(kind, &id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized_and_auth_is_optional() {
        let store = RestStore::new(RestConfig::new("http://backend:8080/api/")).unwrap();
        assert_eq!(&*store.base_url, "http://backend:8080/api");
        assert!(store.auth.is_none());

        let config = RestConfig::new("http://backend").with_credentials("admin", "secret");
        let store = RestStore::new(config).unwrap();
        assert_eq!(store.auth.as_ref().map(|(user, _)| &**user), Some("admin"));
    }
}
