//! ClaimsPage – one claims console instance: loads the collection, renders the selected claim
//! and processes it on request.
//!
//! ## Lifecycle
//! * **init**: call [`ClaimsPage::init`] once. It fetches the collection through the injected
//!   [`ClaimSource`] and fills the cache. A failed fetch is kept as a typed load state, so every
//!   later [`PageView`] carries it and the page can show "claims unavailable" instead of an
//!   empty dropdown.
//! * **view**: [`ClaimsPage::view`] is a pure read of the cache for a given selection. It never
//!   touches the network and never waits on a submission.
//! * **process**: [`ClaimsPage::process`] runs the submitter and turns its result into a
//!   [`Notice`]. Each failure kind gets its own notice.
//!
//! ## After processing
//! The backend mutates the claim, but nothing says whether the console should re-fetch. That
//! choice is a [`RefreshPolicy`]:
//! * `None` (default): the table keeps showing the collection as first loaded.
//! * `ReloadList`: a successful process triggers a full re-fetch of the collection.
//!
//! ```rust,ignore
//! let page = ClaimsPage::new(source, ClaimSchema::default())
//!     .with_refresh_policy(RefreshPolicy::ReloadList);
//! page.init().await.ok();
//! let notice = page.process(Some("C1")).await;
//! let view = page.view(Some("C1"), Some(notice)).await;
//! ```

use serde::Serialize;
use serde_json::Value;
use std::{fmt, str::FromStr, sync::Arc};
use tracing::{info, warn};

use crate::{
    cache::{ClaimCache, LoadState},
    error::{ClaimsError, Result},
    loader::{ClaimLoader, SelectionControl},
    presenter::{ClaimPresenter, DetailsTable},
    schema::ClaimSchema,
    source::ClaimSource,
    submitter::{ClaimSubmitter, SubmitReceipt},
};

/// What to do with the cached collection after a claim was processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    #[default]
    None,
    ReloadList,
}

impl FromStr for RefreshPolicy {
    type Err = ClaimsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(RefreshPolicy::None),
            "reload-list" | "reload_list" => Ok(RefreshPolicy::ReloadList),
            other => Err(ClaimsError::Config(format!("unknown refresh policy: {other}"))),
        }
    }
}

/// User-facing outcome of a process request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Processed { claim_number: String, payload: Value },
    NoSelection,
    AlreadyProcessing { claim_number: String },
    Unreachable { claim_number: String, detail: String },
    InvalidResponse { claim_number: String, detail: String },
    Rejected { claim_number: String, status: u16, message: String },
    Misconfigured { claim_number: String, detail: String },
}

impl Notice {
    pub fn from_outcome(selection: Option<&str>, outcome: Result<SubmitReceipt>) -> Self {
        let claim_number = selection.unwrap_or_default().to_string();
        match outcome {
            Ok(receipt) => Notice::Processed {
                claim_number: receipt.claim_number,
                payload: receipt.payload,
            },
            Err(ClaimsError::Validation(_)) => Notice::NoSelection,
            Err(ClaimsError::SubmissionInFlight(claim_number)) => {
                Notice::AlreadyProcessing { claim_number }
            }
            Err(ClaimsError::Decode(detail)) => Notice::InvalidResponse {
                claim_number,
                detail,
            },
            Err(ClaimsError::Server { status, message }) => Notice::Rejected {
                claim_number,
                status,
                message,
            },
            Err(ClaimsError::Network(detail)) => Notice::Unreachable {
                claim_number,
                detail,
            },
            Err(e @ (ClaimsError::Schema(_) | ClaimsError::Config(_))) => Notice::Misconfigured {
                claim_number,
                detail: e.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Processed { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Processed { claim_number, .. } => {
                write!(f, "Claim {claim_number} processed successfully")
            }
            Notice::NoSelection => write!(f, "Please select a claim to process"),
            Notice::AlreadyProcessing { claim_number } => {
                write!(f, "Claim {claim_number} is already being processed")
            }
            Notice::Unreachable {
                claim_number,
                detail,
            } => write!(
                f,
                "Could not reach the claims service to process {claim_number}: {detail}"
            ),
            Notice::InvalidResponse {
                claim_number,
                detail,
            } => write!(
                f,
                "The claims service sent an unreadable response for {claim_number}: {detail}"
            ),
            Notice::Rejected {
                claim_number,
                status,
                message,
            } => write!(
                f,
                "Processing claim {claim_number} failed ({status}): {message}"
            ),
            Notice::Misconfigured {
                claim_number,
                detail,
            } => write!(
                f,
                "The claims console is misconfigured, could not process {claim_number}: {detail}"
            ),
        }
    }
}

/// Everything needed to draw the page for one selection
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub selection: SelectionControl,
    pub selected: Option<String>,
    pub table: DetailsTable,
    pub notice: Option<Notice>,
    pub load_error: Option<ClaimsError>,
    pub process_enabled: bool,
}

#[derive(Clone)]
pub struct ClaimsPage {
    loader: ClaimLoader,
    presenter: ClaimPresenter,
    submitter: ClaimSubmitter,
    cache: ClaimCache,
    refresh_policy: RefreshPolicy,
}

impl ClaimsPage {
    pub fn new(source: Arc<dyn ClaimSource>, schema: ClaimSchema) -> Self {
        let cache = ClaimCache::new();
        let schema = Arc::new(schema);
        Self {
            loader: ClaimLoader::new(source.clone(), cache.clone(), schema.clone()),
            presenter: ClaimPresenter::new(cache.clone(), schema),
            submitter: ClaimSubmitter::new(source),
            cache,
            refresh_policy: RefreshPolicy::default(),
        }
    }

    pub fn with_refresh_policy(mut self, refresh_policy: RefreshPolicy) -> Self {
        self.refresh_policy = refresh_policy;
        self
    }

    /// Load (or reload) the claim collection
    pub async fn init(&self) -> Result<SelectionControl> {
        self.loader.load().await
    }

    pub fn cache(&self) -> &ClaimCache {
        &self.cache
    }

    /// Page for `selection`, built from a single cache snapshot.
    ///
    /// A selection that is not in the collection is dropped, exactly like the placeholder.
    pub async fn view(&self, selection: Option<&str>, notice: Option<Notice>) -> PageView {
        let (claims, load_error) = match self.cache.snapshot().await {
            LoadState::Loaded(claims) => (claims, None),
            LoadState::Failed(e) => (Arc::new(Vec::new()), Some(e)),
            LoadState::NotLoaded => (Arc::new(Vec::new()), None),
        };

        let table = self.presenter.present_in(&claims, selection);
        let selected = selection
            .filter(|_| table.is_visible())
            .map(str::to_string);
        let process_enabled = selected
            .as_deref()
            .map(|id| !self.submitter.is_in_flight(id))
            .unwrap_or(false);

        PageView {
            selection: SelectionControl::from_claims(&claims, self.presenter.schema().id_field()),
            selected,
            table,
            notice,
            load_error,
            process_enabled,
        }
    }

    /// Process the selected claim and report the outcome
    pub async fn process(&self, selection: Option<&str>) -> Notice {
        let outcome = self.submitter.submit(selection).await;
        let notice = Notice::from_outcome(selection, outcome);

        if notice.is_success() && self.refresh_policy == RefreshPolicy::ReloadList {
            info!("reloading claims after successful processing");
            if let Err(e) = self.loader.load().await {
                warn!(error = %e, "reload after processing failed");
            }
        }

        notice
    }
}
