pub mod cache;
pub mod claim;
pub mod error;
pub mod loader;
pub mod page;
pub mod presenter;
pub mod render;
pub mod schema;
pub mod source;
pub mod submitter;

// Re-export commonly used types
pub use cache::{ClaimCache, LoadState};
pub use claim::Claim;
pub use error::{ClaimsError, Result};
pub use loader::{ClaimLoader, SelectOption, SelectionControl};
pub use page::{ClaimsPage, Notice, PageView, RefreshPolicy};
pub use presenter::{Cell, ClaimPresenter, DetailsTable, Image, Row};
pub use schema::{ClaimSchema, FieldKind};
#[cfg(feature = "http")]
pub use source::HttpClaimSource;
pub use source::{ClaimSource, InMemoryClaimSource};
pub use submitter::{ClaimSubmitter, SubmitReceipt};
