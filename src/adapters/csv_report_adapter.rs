//! CSV report writer.
//!
//! Columns: `timestamp,date,cash,total_value`, then one share-count column
//! per symbol in sorted order.

use crate::domain::error::StocksimError;
use crate::domain::report::{EvaluationReport, ReportTable};
use crate::ports::report_port::ReportPort;
use std::io::Write;
use std::path::Path;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvReportAdapter;

fn csv_err(e: csv::Error) -> StocksimError {
    StocksimError::Data {
        reason: format!("CSV write error: {}", e),
    }
}

/// Writes `table` as CSV to any writer.
pub fn write_table<W: Write>(table: &ReportTable, writer: W) -> Result<(), StocksimError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec![
        "timestamp".to_string(),
        "date".to_string(),
        "cash".to_string(),
        "total_value".to_string(),
    ];
    header.extend(table.symbols.iter().cloned());
    wtr.write_record(&header).map_err(csv_err)?;

    for row in &table.rows {
        let mut record = vec![
            format!("{}", row.timestamp),
            row.datetime.format(DATE_FORMAT).to_string(),
            format!("{:.2}", row.cash),
            format!("{:.2}", row.total_value),
        ];
        record.extend(row.shares.iter().map(|s| s.to_string()));
        wtr.write_record(&record).map_err(csv_err)?;
    }

    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &EvaluationReport<'_>, output_path: &Path) -> Result<(), StocksimError> {
        let table = report.table()?;
        let file = std::fs::File::create(output_path)?;
        write_table(&table, file)
    }
}
