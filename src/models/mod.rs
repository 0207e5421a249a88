//! Core data structures for report submission and retrieval.

mod content;
mod report;

pub use content::{sort_token, ContentKind, ContentQuery, SortDirection};
pub use report::{
    CreateReportResponse, ReportJob, ReportKind, ReportRequest, ReportRequestBuilder, ReportState,
    ReportStatusResponse, TimeWindow,
};
