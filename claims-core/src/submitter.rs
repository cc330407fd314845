use dashmap::{DashMap, mapref::entry::Entry};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    error::{ClaimsError, Result},
    source::ClaimSource,
};

/// Successful processing response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitReceipt {
    pub claim_number: String,
    pub payload: Value,
}

/// Sends process requests, at most one in flight per claim
#[derive(Clone)]
pub struct ClaimSubmitter {
    source: Arc<dyn ClaimSource>,
    in_flight: Arc<DashMap<String, ()>>,
}

/// Releases the claim's in-flight slot when dropped
struct InFlightGuard {
    in_flight: Arc<DashMap<String, ()>>,
    claim_number: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.claim_number);
    }
}

impl ClaimSubmitter {
    pub fn new(source: Arc<dyn ClaimSource>) -> Self {
        Self {
            source,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    pub fn is_in_flight(&self, claim_number: &str) -> bool {
        self.in_flight.contains_key(claim_number)
    }

    fn acquire(&self, claim_number: &str) -> Result<InFlightGuard> {
        match self.in_flight.entry(claim_number.to_string()) {
            Entry::Occupied(_) => Err(ClaimsError::SubmissionInFlight(claim_number.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(InFlightGuard {
                    in_flight: self.in_flight.clone(),
                    claim_number: claim_number.to_string(),
                })
            }
        }
    }

    /// Process the selected claim.
    ///
    /// Fails with a validation error, without touching the network, when
    /// nothing is selected.
    pub async fn submit(&self, selection: Option<&str>) -> Result<SubmitReceipt> {
        let Some(claim_number) = selection.filter(|s| !s.is_empty()) else {
            warn!("process requested without a selected claim");
            return Err(ClaimsError::no_claim_selected());
        };

        let _guard = self.acquire(claim_number).inspect_err(|_| {
            warn!(claim_number = %claim_number, "claim already being processed");
        })?;

        info!(claim_number = %claim_number, "processing claim");
        match self.source.process_claim(claim_number).await {
            Ok(payload) => {
                info!(claim_number = %claim_number, payload = %payload, "claim processed");
                Ok(SubmitReceipt {
                    claim_number: claim_number.to_string(),
                    payload,
                })
            }
            Err(e) => {
                error!(claim_number = %claim_number, error = %e, "failed to process claim");
                Err(e)
            }
        }
    }
}
