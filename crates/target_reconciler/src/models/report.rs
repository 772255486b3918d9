// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while loading or parsing the delivery report.
#[derive(Debug, Error)]
pub(crate) enum ReportError {
    #[error("report line {line}: expected at least 4 fields, found {found}")]
    TooFewFields { line: usize, found: usize },
    #[error("failed to read report file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch report over HTTP: {0}")]
    Http(#[from] reqwest::Error),
}

/// One artifact row of the delivery report. Identity is the
/// (group, artifact, version) coordinate; the remaining fields are carried
/// along for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeliveryRecord {
    #[allow(dead_code)]
    pub status: String,
    pub group: String,
    pub artifact: String,
    pub version: String,
    #[allow(dead_code)]
    pub classifier: String,
    #[allow(dead_code)]
    pub extension: String,
    /// True for records synthesized from a pattern with
    /// `useDeliveryReport = false` instead of parsed from the report.
    pub external_entry: bool,
}

impl DeliveryRecord {
    /// Map key shared by the report store, the repo map builder and the
    /// assembler's backing-record check.
    pub fn key(&self) -> String {
        record_key(&self.group, &self.artifact, &self.version)
    }

    /// Parses one delimited report line, e.g.
    /// `ok : org.foo : bar : 1.2.3 : : jar`. Fields are trimmed; classifier
    /// and extension may be absent.
    pub fn from_delimited(line: &str, line_number: usize) -> Result<Self, ReportError> {
        let fields: Vec<&str> = line.split(':').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(ReportError::TooFewFields {
                line: line_number,
                found: fields.len(),
            });
        }
        Ok(Self {
            status: fields[0].to_string(),
            group: fields[1].to_string(),
            artifact: fields[2].to_string(),
            version: fields[3].to_string(),
            classifier: fields.get(4).copied().unwrap_or_default().to_string(),
            extension: fields.get(5).copied().unwrap_or_default().to_string(),
            external_entry: false,
        })
    }
}

/// Canonical coordinate key for delivery records and their consumers.
pub(crate) fn record_key(group: &str, artifact: &str, version: &str) -> String {
    format!("{group}:{artifact}:{version}")
}
