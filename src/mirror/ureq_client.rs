//! Purpose: Blocking HTTP adapter for the mirror node REST API.
//! Exports: `UreqRestClient`.
//! Role: Implements `RestClient::do_get` for any `JsonRepr` on a shared `ureq` agent.
//! Invariants: Base URLs are http(s) with no path; request paths are absolute (`/api/v1/...`).
//! Invariants: 404 maps to the null document; other non-2xx statuses are query failures.
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::LedgerConfig;
use crate::core::document::{JsonRepr, truncate};
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::mirror::paths;
use crate::mirror::rest::RestClient;

pub struct UreqRestClient<J> {
    inner: Arc<UreqRestClientInner>,
    _json: PhantomData<fn() -> J>,
}

struct UreqRestClientInner {
    base_url: Url,
    agent: ureq::Agent,
}

impl<J> Clone for UreqRestClient<J> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _json: PhantomData,
        }
    }
}

impl<J: JsonRepr> UreqRestClient<J> {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::build(base_url.into(), None)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        Self::build(base_url.into(), Some(timeout))
    }

    /// Uses the network's mirror node and the configured request timeout.
    pub fn from_config(config: &LedgerConfig) -> ApiResult<Self> {
        Self::build(config.mirror_node_url()?.to_string(), config.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn build(raw: String, timeout: Option<Duration>) -> ApiResult<Self> {
        let base_url = normalize_base_url(raw)?;
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            inner: Arc::new(UreqRestClientInner {
                base_url,
                agent: builder.build(),
            }),
            _json: PhantomData,
        })
    }

    fn resolve(&self, path: &str) -> ApiResult<Url> {
        let (resource, pairs) = paths::split_query(path);
        if !resource.starts_with('/') {
            return Err(Error::invalid_argument(format!(
                "mirror path '{path}' must be absolute"
            )));
        }
        let mut url = self.inner.base_url.clone();
        url.set_path(resource);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(&pairs);
        }
        Ok(url)
    }
}

impl<J: JsonRepr> RestClient for UreqRestClient<J> {
    type Json = J;

    fn do_get(&self, path: &str) -> ApiResult<J> {
        let url = self.resolve(path)?;
        let response = self
            .inner
            .agent
            .get(url.as_str())
            .set("Accept", "application/json")
            .call();
        match response {
            Ok(resp) => {
                tracing::debug!(path, status = resp.status(), "mirror get");
                read_json_response(path, resp)
            }
            Err(ureq::Error::Status(404, _)) => {
                tracing::debug!(path, status = 404, "mirror entity not found");
                Ok(J::null())
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                tracing::warn!(path, status = code, "mirror request rejected");
                Err(Error::new(ErrorKind::QueryFailure)
                    .with_message(format!("mirror node returned status {code}"))
                    .with_path(path)
                    .with_document(truncate(&body)))
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::warn!(path, error = %err, "mirror transport failure");
                Err(Error::new(ErrorKind::QueryFailure)
                    .with_message("mirror request failed")
                    .with_path(path)
                    .with_source(err))
            }
        }
    }
}

fn read_json_response<J: JsonRepr>(path: &str, response: ureq::Response) -> ApiResult<J> {
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::QueryFailure)
            .with_message("failed to read response body")
            .with_path(path)
            .with_source(err)
    })?;
    if body.trim().is_empty() {
        return Ok(J::null());
    }
    J::parse(&body).map_err(|err| err.with_path(path))
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|err| {
        Error::invalid_argument(format!("invalid mirror node url '{raw}'")).with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::invalid_argument(
            "mirror node url must use http or https scheme",
        ));
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(Error::invalid_argument(
            "mirror node url must not include a path",
        ));
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{UreqRestClient, normalize_base_url};
    use crate::core::error::ErrorKind;
    use serde_json::Value;

    #[test]
    fn normalize_base_url_strips_trailing_parts() {
        let url = normalize_base_url("https://testnet.mirrornode.hedera.com".to_string())
            .expect("url");
        assert_eq!(url.as_str(), "https://testnet.mirrornode.hedera.com/");
    }

    #[test]
    fn base_url_with_path_is_rejected() {
        let err = normalize_base_url("http://localhost:5551/api".to_string()).expect_err("path");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = normalize_base_url("ftp://localhost".to_string()).expect_err("scheme");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn resolve_keeps_query_pairs() {
        let client = UreqRestClient::<Value>::new("http://127.0.0.1:5551").expect("client");
        let url = client
            .resolve("/api/v1/tokens/0.0.1/balances?account.id=0.0.2&limit=25")
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5551/api/v1/tokens/0.0.1/balances?account.id=0.0.2&limit=25"
        );
    }

    #[test]
    fn relative_path_is_rejected() {
        let client = UreqRestClient::<Value>::new("http://127.0.0.1:5551").expect("client");
        let err = client.resolve("api/v1/tokens").expect_err("relative");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
