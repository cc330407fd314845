use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ClaimsError, Result};

pub const DEFAULT_ID_FIELD: &str = "claimNumber";

/// How a claim field is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain value shown as text
    Scalar,
    /// One URL to a document or image
    SingleFile,
    /// Ordered list of image URLs
    MultiFile,
}

/// Field kinds for a claim collection plus the name of the identifying field.
///
/// Fields not listed are [`FieldKind::Scalar`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSchema {
    #[serde(default = "default_id_field")]
    id_field: String,
    #[serde(default)]
    fields: HashMap<String, FieldKind>,
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

impl ClaimSchema {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    /// Parse a schema document such as
    /// `{"idField":"claimNumber","fields":{"receiptImage":"single_file"}}`.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let schema: ClaimSchema =
            serde_json::from_str(raw).map_err(|e| ClaimsError::Schema(e.to_string()))?;
        if schema.id_field.trim().is_empty() {
            return Err(ClaimsError::Schema("idField must not be empty".to_string()));
        }
        if schema.kind_of(&schema.id_field) != FieldKind::Scalar {
            return Err(ClaimsError::Schema(format!(
                "identifying field {} must be scalar",
                schema.id_field
            )));
        }
        Ok(schema)
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn kind_of(&self, field: &str) -> FieldKind {
        self.fields.get(field).copied().unwrap_or(FieldKind::Scalar)
    }
}

impl Default for ClaimSchema {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FIELD)
            .with_field("receiptImage", FieldKind::SingleFile)
            .with_field("claimDocuments", FieldKind::SingleFile)
            .with_field("beforeIncidentImages", FieldKind::MultiFile)
            .with_field("afterIncidentImages", FieldKind::MultiFile)
    }
}
