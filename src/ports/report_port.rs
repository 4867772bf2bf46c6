//! Report output port.

use crate::domain::error::ScreenerError;
use crate::domain::screen::ScreenReport;
use std::fs;
use std::path::Path;

/// Port for rendering and writing screen reports.
pub trait ReportPort {
    fn render(&self, report: &ScreenReport) -> Result<String, ScreenerError>;

    /// Default implementation: renders the report and writes it to `output_path`,
    /// creating parent directories as needed.
    fn write(&self, report: &ScreenReport, output_path: &Path) -> Result<(), ScreenerError> {
        let content = self.render(report)?;
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, content)?;
        Ok(())
    }
}
