// SPDX-License-Identifier: Apache-2.0

//! Delivery report store: loads the colon-delimited artifact inventory and
//! injects synthetic records for patterns that opt out of report-driven
//! resolution.

use std::collections::BTreeMap;

use tracing::{error, info};

use crate::fetch::is_http_url;
use crate::matcher::PLACEHOLDER_VERSION;
use crate::models::config::{ReconcilerConfig, UrlPattern};
use crate::models::report::{DeliveryRecord, ReportError};

/// Records keyed by their group:artifact:version coordinate. Ordered so every
/// downstream iteration over the store is deterministic.
pub(crate) type ReportStore = BTreeMap<String, DeliveryRecord>;

/// Loads the delivery report named by the configuration and appends the
/// synthetic external records. An unreadable or malformed report is logged
/// and degrades to an empty store; the synthetic records are injected either
/// way so non-report families still resolve.
pub(crate) async fn load(config: &ReconcilerConfig, client: &reqwest::Client) -> ReportStore {
    let location = expand_report_url(&config.report_location, &config.version);
    let mut records = match load_report(&location, config.report_lines_to_skip, client).await {
        Ok(records) => {
            info!("loaded {} delivery records from {}", records.len(), location);
            records
        }
        Err(err) => {
            error!("failed to load delivery report from {location}: {err}");
            ReportStore::new()
        }
    };
    inject_external_records(&mut records, &config.patterns);
    records
}

/// Reads and parses the report from a local file or HTTP(S) URL, skipping the
/// configured number of header lines. Blank lines are ignored; a line with
/// fewer than four fields fails the whole load.
pub(crate) async fn load_report(
    location: &str,
    lines_to_skip: usize,
    client: &reqwest::Client,
) -> Result<ReportStore, ReportError> {
    let text = if is_http_url(location) {
        client
            .get(location)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?
    } else {
        tokio::fs::read_to_string(location).await?
    };

    let mut records = ReportStore::new();
    for (index, line) in text.lines().enumerate().skip(lines_to_skip) {
        if line.trim().is_empty() {
            continue;
        }
        let record = DeliveryRecord::from_delimited(line, index + 1)?;
        records.insert(record.key(), record);
    }
    Ok(records)
}

/// Synthesizes one external record per pattern with
/// `useDeliveryReport = false`, keyed like parsed records so the matcher
/// treats both uniformly.
pub(crate) fn inject_external_records(records: &mut ReportStore, patterns: &[UrlPattern]) {
    for pattern in patterns.iter().filter(|p| !p.use_delivery_report) {
        let record = DeliveryRecord {
            status: String::new(),
            group: pattern.group_id.clone(),
            artifact: pattern.artifact.clone(),
            version: pattern.version.clone(),
            classifier: String::new(),
            extension: String::new(),
            external_entry: true,
        };
        records.insert(record.key(), record);
    }
}

/// Expands the `$VERSION$` placeholder in a report location.
pub(crate) fn expand_report_url(location: &str, version: &str) -> String {
    location.replace(PLACEHOLDER_VERSION, version)
}
