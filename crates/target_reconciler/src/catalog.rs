// SPDX-License-Identifier: Apache-2.0

//! Parses repository content catalogs into unit lists.

use std::collections::HashMap;

use roxmltree::Document;
use tracing::error;

use crate::models::repo::{CatalogUnit, RepoData};

/// Parses a unit catalog. Blank input yields an empty list; malformed XML is
/// logged and also yields an empty list. Never an error to the caller, so one
/// bad repository cannot abort the run.
pub(crate) fn parse_units(xml: &str) -> Vec<CatalogUnit> {
    if xml.trim().is_empty() {
        return Vec::new();
    }
    let doc = match Document::parse(xml) {
        Ok(doc) => doc,
        Err(err) => {
            error!("failed to parse unit catalog: {err}");
            return Vec::new();
        }
    };
    doc.descendants()
        .filter(|node| node.has_tag_name("unit"))
        .map(|node| CatalogUnit {
            id: node.attribute("id").unwrap_or_default().to_string(),
            version: node.attribute("version").unwrap_or_default().to_string(),
            singleton: node.attribute("singleton").unwrap_or_default().to_string(),
            generation: node.attribute("generation").unwrap_or_default().to_string(),
        })
        .collect()
}

/// Parses every fetched catalog, one blocking task per repository.
/// `parse_units` is stateless, so the fan-out is safe.
pub(crate) async fn parse_all(
    catalogs: HashMap<RepoData, String>,
) -> HashMap<RepoData, Vec<CatalogUnit>> {
    let tasks = catalogs.into_iter().map(|(repo, xml)| async move {
        let units = tokio::task::spawn_blocking(move || parse_units(&xml))
            .await
            .unwrap_or_default();
        (repo, units)
    });
    futures::future::join_all(tasks).await.into_iter().collect()
}
