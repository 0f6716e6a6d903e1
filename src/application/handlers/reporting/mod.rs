//! Admin reporting handlers.

mod treasury_report;

pub use treasury_report::{TreasuryReport, TreasuryReportHandler, TreasuryReportQuery};
