use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::{
    cache::ClaimCache,
    claim::{Claim, is_truthy, script_text},
    schema::{ClaimSchema, FieldKind},
};

pub const FILE_LINK_LABEL: &str = "View File";
pub const THUMBNAIL_WIDTH_PX: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub src: String,
    pub width_px: u32,
}

/// Value cell of a details row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cell {
    Text { text: String },
    /// Opens in a new browsing context
    Link { href: String, label: String },
    Images { images: Vec<Image> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub field: String,
    pub cell: Cell,
}

/// Two-column field/value table for the selected claim
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DetailsTable {
    visible: bool,
    rows: Vec<Row>,
}

impl DetailsTable {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn for_claim(claim: &Claim, schema: &ClaimSchema) -> Self {
        let rows = claim
            .fields()
            .map(|(field, value)| Row {
                field: field.clone(),
                cell: render_cell(schema.kind_of(field), value),
            })
            .collect();
        Self {
            visible: true,
            rows,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

fn render_cell(kind: FieldKind, value: &Value) -> Cell {
    match (kind, value) {
        (FieldKind::SingleFile, value) if is_truthy(value) => Cell::Link {
            href: script_text(value),
            label: FILE_LINK_LABEL.to_string(),
        },
        (FieldKind::MultiFile, Value::Array(items)) => Cell::Images {
            images: items
                .iter()
                .map(|item| Image {
                    src: script_text(item),
                    width_px: THUMBNAIL_WIDTH_PX,
                })
                .collect(),
        },
        (_, value) => Cell::Text {
            text: script_text(value),
        },
    }
}

/// Renders the claim picked in the selection control
#[derive(Clone)]
pub struct ClaimPresenter {
    cache: ClaimCache,
    schema: Arc<ClaimSchema>,
}

impl ClaimPresenter {
    pub fn new(cache: ClaimCache, schema: Arc<ClaimSchema>) -> Self {
        Self { cache, schema }
    }

    /// Table for `selection`; hidden when nothing or an unknown claim is selected
    pub async fn present(&self, selection: Option<&str>) -> DetailsTable {
        self.present_in(&self.cache.claims().await, selection)
    }

    /// Same as [`ClaimPresenter::present`], against an already taken snapshot
    pub fn present_in(&self, claims: &[Claim], selection: Option<&str>) -> DetailsTable {
        let Some(claim_number) = selection.filter(|s| !s.is_empty()) else {
            return DetailsTable::hidden();
        };

        let id_field = self.schema.id_field();
        match claims.iter().find(|claim| claim.identifier(id_field) == claim_number) {
            Some(claim) => DetailsTable::for_claim(claim, &self.schema),
            None => {
                debug!(claim_number = %claim_number, "selected claim not in cache");
                DetailsTable::hidden()
            }
        }
    }

    pub fn schema(&self) -> &ClaimSchema {
        &self.schema
    }
}
