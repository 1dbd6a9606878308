//! Annotation export formats and save scheduling.
//!
//! Two export surfaces are supported:
//!
//! - **Structured JSON**: resolution-independent document with pixel and
//!   normalized coordinates per point ([`structured`])
//! - **Raster PNG**: annotations flattened onto the source image at its
//!   natural resolution ([`raster`])
//!
//! [`AutoSaveManager`] schedules persistence of the live annotation set
//! between explicit exports.

mod auto_save;
mod error;
pub mod raster;
pub mod structured;

pub use auto_save::AutoSaveManager;
pub use error::ExportError;
pub use structured::{ExportAnnotation, ExportDocument, ExportMetadata, ExportPoint};
