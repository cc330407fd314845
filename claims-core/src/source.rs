use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::{
    claim::Claim,
    error::{ClaimsError, Result},
    schema::DEFAULT_ID_FIELD,
};

/// Backend the console reads claims from and sends processing requests to
#[async_trait]
pub trait ClaimSource: Send + Sync {
    /// Fetch the full claim collection, in backend order
    async fn list_claims(&self) -> Result<Vec<Claim>>;

    /// Ask the backend to process one claim and return its JSON payload
    async fn process_claim(&self, claim_number: &str) -> Result<Value>;
}

/// In-memory implementation of ClaimSource, keyed by `claimNumber`
pub struct InMemoryClaimSource {
    claims: Arc<RwLock<Vec<Claim>>>,
    listing_failure: Mutex<Option<ClaimsError>>,
    processed: Arc<Mutex<Vec<String>>>,
    process_delay: Option<Duration>,
}

impl InMemoryClaimSource {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self {
            claims: Arc::new(RwLock::new(claims)),
            listing_failure: Mutex::new(None),
            processed: Arc::new(Mutex::new(Vec::new())),
            process_delay: None,
        }
    }

    /// Delay every processing request, to observe in-flight behavior
    pub fn with_process_delay(mut self, delay: Duration) -> Self {
        self.process_delay = Some(delay);
        self
    }

    /// Make subsequent listing calls fail with `error`, or succeed again with `None`
    pub fn set_listing_failure(&self, error: Option<ClaimsError>) {
        if let Ok(mut slot) = self.listing_failure.lock() {
            *slot = error;
        }
    }

    pub fn replace_claims(&self, claims: Vec<Claim>) {
        if let Ok(mut guard) = self.claims.write() {
            *guard = claims;
        }
    }

    /// Claim numbers processed so far, in request order
    pub fn processed(&self) -> Vec<String> {
        self.processed
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ClaimSource for InMemoryClaimSource {
    async fn list_claims(&self) -> Result<Vec<Claim>> {
        if let Some(err) = self.listing_failure.lock().ok().and_then(|slot| slot.clone()) {
            return Err(err);
        }
        self.claims
            .read()
            .map(|guard| guard.clone())
            .map_err(|e| ClaimsError::Network(e.to_string()))
    }

    async fn process_claim(&self, claim_number: &str) -> Result<Value> {
        if let Ok(mut processed) = self.processed.lock() {
            processed.push(claim_number.to_string());
        }
        if let Some(delay) = self.process_delay {
            tokio::time::sleep(delay).await;
        }

        let known = self
            .claims
            .read()
            .map(|guard| {
                guard
                    .iter()
                    .any(|claim| claim.identifier(DEFAULT_ID_FIELD) == claim_number)
            })
            .unwrap_or(false);

        if !known {
            return Err(ClaimsError::Server {
                status: 404,
                message: "Claim not found".to_string(),
            });
        }

        Ok(json!({
            "message": "Claim processed successfully",
            "claimNumber": claim_number,
        }))
    }
}

#[cfg(feature = "http")]
pub use http::HttpClaimSource;

#[cfg(feature = "http")]
mod http {
    use super::*;
    use reqwest::{Client, Response, Url};
    use tracing::{debug, warn};

    const LIST_PATH: &str = "get-claims";
    const PROCESS_PATH: &str = "process-claim";

    /// ClaimSource talking JSON over HTTP to the claims backend
    #[derive(Clone)]
    pub struct HttpClaimSource {
        client: Client,
        base_url: Url,
    }

    impl HttpClaimSource {
        pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
            let mut base_url = Url::parse(base_url)
                .map_err(|e| ClaimsError::Config(format!("invalid base url {base_url}: {e}")))?;
            if base_url.cannot_be_a_base() {
                return Err(ClaimsError::Config(format!(
                    "base url {base_url} cannot carry a path"
                )));
            }
            // Joining relies on a trailing slash to keep any path prefix
            if !base_url.path().ends_with('/') {
                let path = format!("{}/", base_url.path());
                base_url.set_path(&path);
            }

            let mut builder = Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder
                .build()
                .map_err(|e| ClaimsError::Config(e.to_string()))?;

            Ok(Self { client, base_url })
        }

        pub fn base_url(&self) -> &Url {
            &self.base_url
        }

        pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
            let mut url = self.base_url.clone();
            url.path_segments_mut()
                .map_err(|_| ClaimsError::Config("base url cannot carry a path".to_string()))?
                .pop_if_empty()
                .extend(segments);
            Ok(url)
        }

        async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                warn!(status = status.as_u16(), body = %body, "claims backend returned an error");
                return Err(ClaimsError::Server {
                    status: status.as_u16(),
                    message: body.trim().to_string(),
                });
            }
            Ok(serde_json::from_str(&body)?)
        }
    }

    #[async_trait]
    impl ClaimSource for HttpClaimSource {
        async fn list_claims(&self) -> Result<Vec<Claim>> {
            let url = self.endpoint(&[LIST_PATH])?;
            debug!(url = %url, "fetching claims");
            let response = self.client.get(url).send().await?;
            Self::read_json(response).await
        }

        async fn process_claim(&self, claim_number: &str) -> Result<Value> {
            let url = self.endpoint(&[PROCESS_PATH, claim_number])?;
            debug!(url = %url, claim_number = %claim_number, "sending process request");
            let response = self
                .client
                .post(url)
                .json(&json!({ "claimNumber": claim_number }))
                .send()
                .await?;
            Self::read_json(response).await
        }
    }
}
