//! Report output port trait.

use crate::domain::error::TradeTrackError;
use crate::domain::pipeline::AssetReport;

/// Port for persisting analysis results.
pub trait ReportPort {
    fn write(&self, reports: &[AssetReport], output_path: &str) -> Result<(), TradeTrackError>;
}
