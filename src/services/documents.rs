// Report card and syllabus uploads
//
// Files are checked locally (exists, non-empty, accepted extension) before
// anything is sent; the backend does the actual parsing.

use crate::services::tools::{ToolError, ToolOutcome, ToolService};
use crate::state::{RequestKind, RequestOutput, View};
use camino::Utf8Path;
use std::time::Instant;

pub const REPORT_CARD_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];
pub const SYLLABUS_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

/// A file read into memory, ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub async fn from_path(path: &Utf8Path, allowed_extensions: &[&str]) -> Result<Self, ToolError> {
        let invalid = |reason: &str| ToolError::InvalidFile {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let file_name = path.file_name().ok_or_else(|| invalid("not a file"))?;
        let extension = path
            .extension()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !allowed_extensions.contains(&extension.as_str()) {
            return Err(invalid(&format!(
                "expected one of: {}",
                allowed_extensions.join(", ")
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| invalid(&e.to_string()))?;
        if bytes.is_empty() {
            return Err(invalid("file is empty"));
        }

        Ok(Self {
            file_name: file_name.to_string(),
            bytes,
        })
    }

    pub fn size_label(&self) -> String {
        format_file_size(self.bytes.len() as u64)
    }
}

/// Human-readable byte count: "0 Bytes", "1.5 KB", "2 MB".
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

impl ToolService {
    /// Upload a report card for analysis. The subjects view must be showing.
    pub async fn upload_report_card(&self, path: &Utf8Path) -> Result<ToolOutcome, ToolError> {
        let file = UploadFile::from_path(path, &REPORT_CARD_EXTENSIONS).await?;
        self.open_view(View::Subjects)?;

        let Some(ticket) = self.begin(RequestKind::ReportCard, None) else {
            return Ok(ToolOutcome::AlreadyPending);
        };
        let started = Instant::now();

        let result = self
            .backend()
            .upload_report_card(&file)
            .await
            .map(RequestOutput::ReportCard);
        Ok(self.finish(ticket, started, result))
    }

    pub async fn upload_syllabus(&self, path: &Utf8Path) -> Result<ToolOutcome, ToolError> {
        let file = UploadFile::from_path(path, &SYLLABUS_EXTENSIONS).await?;
        self.open_view(View::Syllabus)?;

        let Some(ticket) = self.begin(RequestKind::Syllabus, None) else {
            return Ok(ToolOutcome::AlreadyPending);
        };
        let started = Instant::now();

        let result = self
            .backend()
            .upload_syllabus(&file)
            .await
            .map(RequestOutput::Syllabus);
        Ok(self.finish(ticket, started, result))
    }

    fn open_view(&self, view: View) -> Result<(), ToolError> {
        self.state()
            .navigate(view)
            .map(|_| ())
            .map_err(|_| ToolError::PreferencesRequired)
    }
}
