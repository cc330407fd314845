use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{claim::Claim, error::ClaimsError};

/// Outcome of the most recent listing request
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded(Arc<Vec<Claim>>),
    Failed(ClaimsError),
}

/// Claim collection shared between the loader and the presenter.
///
/// The loader is the only writer; readers take cheap snapshots.
#[derive(Clone, Debug, Default)]
pub struct ClaimCache {
    state: Arc<RwLock<LoadState>>,
}

impl ClaimCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, claims: Vec<Claim>) {
        *self.state.write().await = LoadState::Loaded(Arc::new(claims));
    }

    pub async fn store_failure(&self, error: ClaimsError) {
        *self.state.write().await = LoadState::Failed(error);
    }

    pub async fn snapshot(&self) -> LoadState {
        self.state.read().await.clone()
    }

    /// Loaded claims, empty when nothing has been loaded
    pub async fn claims(&self) -> Arc<Vec<Claim>> {
        match &*self.state.read().await {
            LoadState::Loaded(claims) => claims.clone(),
            _ => Arc::new(Vec::new()),
        }
    }
}
