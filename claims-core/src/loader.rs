use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    cache::ClaimCache,
    claim::Claim,
    error::Result,
    schema::ClaimSchema,
    source::ClaimSource,
};

pub const PLACEHOLDER_LABEL: &str = "-- Select a claim --";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Options of the claim selection control, led by an empty placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionControl {
    options: Vec<SelectOption>,
}

impl SelectionControl {
    pub fn placeholder_only() -> Self {
        Self {
            options: vec![SelectOption {
                value: String::new(),
                label: PLACEHOLDER_LABEL.to_string(),
            }],
        }
    }

    pub fn from_claims(claims: &[Claim], id_field: &str) -> Self {
        let mut control = Self::placeholder_only();
        control.options.extend(claims.iter().map(|claim| {
            let id = claim.identifier(id_field);
            SelectOption {
                value: id.clone(),
                label: id,
            }
        }));
        control
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Option values excluding the placeholder
    pub fn claim_numbers(&self) -> impl Iterator<Item = &str> {
        self.options.iter().skip(1).map(|o| o.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Fetches the claim collection into the cache
#[derive(Clone)]
pub struct ClaimLoader {
    source: Arc<dyn ClaimSource>,
    cache: ClaimCache,
    schema: Arc<ClaimSchema>,
}

impl ClaimLoader {
    pub fn new(source: Arc<dyn ClaimSource>, cache: ClaimCache, schema: Arc<ClaimSchema>) -> Self {
        Self {
            source,
            cache,
            schema,
        }
    }

    /// Fetch all claims, store them verbatim and build the selection control.
    ///
    /// A failed fetch is recorded in the cache so the page can show it.
    pub async fn load(&self) -> Result<SelectionControl> {
        match self.source.list_claims().await {
            Ok(claims) => {
                info!(count = claims.len(), "claims loaded");
                let control = SelectionControl::from_claims(&claims, self.schema.id_field());
                self.cache.store(claims).await;
                Ok(control)
            }
            Err(e) => {
                error!(error = %e, "failed to load claims");
                self.cache.store_failure(e.clone()).await;
                Err(e)
            }
        }
    }
}
