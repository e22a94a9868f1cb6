//! JSON report adapter implementing ReportPort.
//!
//! Writes every asset report as one JSON array. Undefined indicator values serialize as `null`.

use std::fs;
use std::path::Path;

use crate::domain::error::TradeTrackError;
use crate::domain::pipeline::AssetReport;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, reports: &[AssetReport], output_path: &str) -> Result<(), TradeTrackError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(reports)
        } else {
            serde_json::to_string(reports)
        }
        .map_err(|e| TradeTrackError::Io(std::io::Error::other(e.to_string())))?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(TradeTrackError::Io)?;
        }
        fs::write(path, json).map_err(TradeTrackError::Io)?;

        Ok(())
    }
}
