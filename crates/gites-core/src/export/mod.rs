//! Document export.
//!
//! - **source**: Lists and captures the elements of a group
//! - **layout**: Greedy pagination of captures onto fixed-size sheets
//! - **document**: PDF assembly from a layout
//! - **exporter**: Orchestrates one export end to end
//! - **sink**: Hands finished documents to the user

pub mod document;
pub mod exporter;
pub mod layout;
pub mod sink;
pub mod source;

pub use document::render_pdf;
pub use exporter::DocumentExporter;
pub use layout::{PageLayout, PageSize, Placement};
pub use sink::{DocumentSink, FileSink};
pub use source::{DirectorySource, Element, ElementSource};
