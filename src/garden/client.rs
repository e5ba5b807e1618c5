use std::collections::HashMap;
use std::path::PathBuf;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{Method, Request, header};
use tower::ServiceExt;

use super::models::{ContainerInfoEntry, ContainerMetricsEntry, ContainersResponse, GardenError};
use super::unix::UnixConnector;
use super::{Error, Result};

/// The subset of the Garden API used by the collector.
pub trait GardenApi: Send + Sync {
    /// Health probe; succeeds once the server answers.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Lists the handles of all containers.
    fn containers(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Fetches container info for all `handles` in one request.
    ///
    /// Per-container failures are reported inside the returned entries.
    fn bulk_info(
        &self,
        handles: &[String],
    ) -> impl Future<Output = Result<HashMap<String, ContainerInfoEntry>>> + Send;

    /// Fetches resource metrics for all `handles` in one request.
    fn bulk_metrics(
        &self,
        handles: &[String],
    ) -> impl Future<Output = Result<HashMap<String, ContainerMetricsEntry>>> + Send;
}

/// Garden API client speaking HTTP/1.1 over a unix socket.
///
/// Every request uses its own connection, so the client holds no connection
/// state and a restarted server is picked up transparently.
#[derive(Debug, Clone)]
pub struct HttpGardenClient {
    connector: UnixConnector,
}

impl HttpGardenClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            connector: UnixConnector::new(socket_path),
        }
    }

    async fn get(&self, path_and_query: &str) -> Result<Bytes> {
        let uri = format!("http://garden{path_and_query}");
        // The connection writes the target verbatim, so it must be in origin form.
        let request = Request::builder()
            .method(Method::GET)
            .uri(path_and_query)
            .header(header::HOST, "garden")
            .body(Empty::<Bytes>::new())
            .map_err(|source| Error::InvalidRequest {
                uri: uri.clone(),
                source,
            })?;

        let io = self
            .connector
            .clone()
            .oneshot(request.uri().clone())
            .await
            .map_err(|source| Error::SocketConnect {
                path: self.connector.path().to_path_buf(),
                source,
            })?;
        let (mut sender, connection) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(Error::Handshake)?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                log::debug!("garden connection closed with error: {}", err);
            }
        });

        log::trace!("GET {}", uri);
        let response = sender
            .send_request(request)
            .await
            .map_err(|source| Error::Request {
                uri: uri.clone(),
                source,
            })?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|source| Error::Request {
                uri: uri.clone(),
                source,
            })?
            .to_bytes();

        if !status.is_success() {
            let message = serde_json::from_slice::<GardenError>(&body)
                .map(|err| err.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_owned());
            return Err(Error::Status {
                uri,
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let body = self.get(path_and_query).await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            uri: path_and_query.to_owned(),
            source,
        })
    }
}

/// Builds `<path>?handles=<h1>,<h2>,...` with each handle form-encoded.
fn bulk_path(path: &str, handles: &[String]) -> String {
    let handles = handles
        .iter()
        .map(|h| url::form_urlencoded::byte_serialize(h.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(",");
    format!("{path}?handles={handles}")
}

impl GardenApi for HttpGardenClient {
    async fn ping(&self) -> Result<()> {
        self.get("/ping").await.map(|_| ())
    }

    async fn containers(&self) -> Result<Vec<String>> {
        let response: ContainersResponse = self.get_json("/containers").await?;
        Ok(response.handles)
    }

    async fn bulk_info(&self, handles: &[String]) -> Result<HashMap<String, ContainerInfoEntry>> {
        if handles.is_empty() {
            return Ok(HashMap::new());
        }
        self.get_json(&bulk_path("/containers/bulk_info", handles))
            .await
    }

    async fn bulk_metrics(
        &self,
        handles: &[String],
    ) -> Result<HashMap<String, ContainerMetricsEntry>> {
        if handles.is_empty() {
            return Ok(HashMap::new());
        }
        self.get_json(&bulk_path("/containers/bulk_metrics", handles))
            .await
    }
}
