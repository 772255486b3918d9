// SPDX-License-Identifier: Apache-2.0

//! Concurrent download of repository metadata archives and extraction of the
//! embedded unit-catalog XML.

use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::models::repo::RepoData;

const XML_SUFFIX: &str = ".xml";

/// Returns true when the location should be fetched over HTTP(S) rather than
/// read from the local filesystem.
pub(crate) fn is_http_url(location: &str) -> bool {
    reqwest::Url::parse(location)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Downloads every distinct repository's metadata archive concurrently, one
/// task per repository, and returns the extracted catalog text per
/// repository. A failed download logs an error and contributes an empty
/// string; on coordinate collision the first fetched value is kept.
pub(crate) async fn fetch_all(
    repos: &HashSet<RepoData>,
    client: &reqwest::Client,
) -> HashMap<RepoData, String> {
    let tasks = repos.iter().map(|repo| async move {
        info!("downloading repository archive {}", repo.location);
        let text = match fetch_catalog_text(&repo.location, client).await {
            Ok(text) => text,
            Err(err) => {
                error!("failed to fetch {}: {err:#}", repo.location);
                String::new()
            }
        };
        (repo.clone(), text)
    });

    let mut catalogs = HashMap::new();
    for (repo, text) in futures::future::join_all(tasks).await {
        catalogs.entry(repo).or_insert(text);
    }
    catalogs
}

async fn fetch_catalog_text(location: &str, client: &reqwest::Client) -> Result<String> {
    let bytes = if is_http_url(location) {
        client
            .get(location)
            .send()
            .await
            .context("request failed")?
            .error_for_status()
            .context("server returned an error status")?
            .bytes()
            .await
            .context("failed to read response body")?
            .to_vec()
    } else {
        tokio::fs::read(location)
            .await
            .context("failed to read archive file")?
    };
    extract_catalog_xml(&bytes)
}

/// Scans the archive and concatenates the text of every entry whose name ends
/// in `.xml`. Normally exactly one `content.xml` exists, but uniqueness is
/// not assumed.
pub(crate) fn extract_catalog_xml(bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("archive is not a valid zip")?;
    let mut xml = String::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("failed to open archive entry {index}"))?;
        if entry.name().ends_with(XML_SUFFIX) {
            entry
                .read_to_string(&mut xml)
                .with_context(|| format!("entry {} is not valid UTF-8", entry.name()))?;
            xml.push('\n');
        }
    }
    Ok(xml)
}
