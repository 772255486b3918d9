// SPDX-License-Identifier: Apache-2.0

use std::hash::{Hash, Hasher};

use crate::models::report::record_key;

/// File name of the metadata archive every resolved repository location must
/// point at. Stripped again when the URL is written into a target file.
pub(crate) const CONTENT_JAR: &str = "content.jar";

/// A repository resolved from a delivery record and a URL pattern.
///
/// Equality and hashing cover only the (group, artifact, version) coordinate:
/// the same repository reached through differently spelled locations must
/// collapse to one download.
#[derive(Debug, Clone)]
pub(crate) struct RepoData {
    pub group: String,
    pub artifact: String,
    pub version: String,
    /// Fully resolved URL, normalized to end in the metadata archive name.
    pub location: String,
}

impl RepoData {
    /// Key into the delivery record map, used to confirm a resolved
    /// repository is still backed by a report entry.
    pub fn coordinate_key(&self) -> String {
        record_key(&self.group, &self.artifact, &self.version)
    }

    /// Appends the metadata archive name, respecting a trailing slash.
    pub fn normalize_location(&mut self) {
        if self.location.ends_with('/') {
            self.location.push_str(CONTENT_JAR);
        } else {
            self.location.push('/');
            self.location.push_str(CONTENT_JAR);
        }
    }
}

impl PartialEq for RepoData {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group
            && self.artifact == other.artifact
            && self.version == other.version
    }
}

impl Eq for RepoData {}

impl Hash for RepoData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group.hash(state);
        self.artifact.hash(state);
        self.version.hash(state);
    }
}

/// Removes the metadata archive name from a repository URL, leaving the form
/// stored in target files (trailing slash preserved).
pub(crate) fn strip_archive_suffix(url: &str) -> String {
    url.replace(CONTENT_JAR, "")
}

/// One installable unit read from a repository's content catalog. Identity
/// for index-building purposes is the id alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CatalogUnit {
    pub id: String,
    pub version: String,
    /// Carried from the catalog for completeness; not consulted when
    /// rewriting targets.
    #[allow(dead_code)]
    pub singleton: String,
    #[allow(dead_code)]
    pub generation: String,
}
