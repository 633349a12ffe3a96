//! Report generation port trait.

use crate::domain::error::StocksimError;
use crate::domain::report::EvaluationReport;
use std::path::Path;

/// Port for persisting an evaluation report.
pub trait ReportPort {
    fn write(&self, report: &EvaluationReport<'_>, output_path: &Path) -> Result<(), StocksimError>;
}
