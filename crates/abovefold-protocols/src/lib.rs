//! Shared data model for the abovefold extraction pipeline.
//!
//! Everything that crosses a crate boundary lives here: viewport profiles,
//! performance constants, paint/DOM snapshots, extraction results and the
//! error taxonomy. The types are plain data; the pipeline crates own all
//! behavior.

mod error;
mod profile;
mod result;
mod snapshot;
mod viewport;

pub use error::ExtractError;
pub use profile::{PerformanceProfile, RECOMMENDED_MAX_BYTES};
pub use result::{CombinedCss, DualExtractionResult, ExtractionResult, ValidationReport};
pub use snapshot::{BoundingRect, ElementSnapshot, PageViewportInfo, PaintEntry, StyleSnapshot};
pub use viewport::ViewportProfile;
