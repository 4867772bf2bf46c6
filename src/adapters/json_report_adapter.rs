//! Full screen report as pretty-printed JSON.

use crate::domain::error::ScreenerError;
use crate::domain::screen::ScreenReport;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

impl ReportPort for JsonReportAdapter {
    fn render(&self, report: &ScreenReport) -> Result<String, ScreenerError> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
