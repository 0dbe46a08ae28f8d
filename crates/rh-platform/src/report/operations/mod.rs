//! Report Operations

pub mod file;
pub mod resolve;

pub use file::{FileReportCommand, FileReportUseCase};
pub use resolve::{ResolveReportCommand, ResolveReportUseCase, REPORT_RESOLVED_MESSAGE};
