// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result, bail};
use roxmltree::{Document, Node};

/// Number of report header lines skipped when the configuration does not say
/// otherwise.
const DEFAULT_REPORT_LINES_TO_SKIP: usize = 2;

/// Typed form of the reconciler configuration XML (`<targetDetails>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReconcilerConfig {
    /// Version stamped into output target names and the report URL.
    pub version: String,
    /// Delivery report location, a local path or HTTP(S) URL. May contain a
    /// `$VERSION$` placeholder.
    pub report_location: String,
    pub report_lines_to_skip: usize,
    /// Output file name template supporting `$COMPONENT$` and `$VERSION$`.
    pub target_save_format: String,
    pub patterns: Vec<UrlPattern>,
}

/// One artifact family's rewrite rule: how its current naming convention maps
/// onto the future one, and the shape of the new repository URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct UrlPattern {
    pub current_group_format: String,
    pub future_group_format: String,
    pub current_artifact_format: String,
    pub future_artifact_format: String,
    pub current_version_format: String,
    pub future_version_format: String,
    /// URL template with `$GROUP$`/`$ARTIFACT$`/`$VERSION$` placeholders.
    pub url_template: String,
    /// Pinned version; empty for families driven by the delivery report.
    pub version: String,
    pub use_delivery_report: bool,
    /// Coordinates used to synthesize a record when the report is opted out.
    pub group_id: String,
    pub artifact: String,
    pub component: String,
}

impl ReconcilerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::from_xml(&text)
            .with_context(|| format!("invalid configuration {}", path.display()))
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml).context("configuration is not well-formed XML")?;
        let root = doc.root_element();
        if !root.has_tag_name("targetDetails") {
            bail!("expected root element <targetDetails>, found <{}>", root.tag_name().name());
        }

        let version = child_text(&root, "version");
        if version.is_empty() {
            bail!("configuration is missing <version>");
        }
        let report_location = child_text(&root, "reportLocation");
        if report_location.is_empty() {
            bail!("configuration is missing <reportLocation>");
        }
        let report_lines_to_skip = match child(&root, "reportLinesToSkip") {
            Some(node) => node
                .text()
                .unwrap_or_default()
                .trim()
                .parse()
                .context("<reportLinesToSkip> is not a number")?,
            None => DEFAULT_REPORT_LINES_TO_SKIP,
        };
        let target_save_format = child_text(&root, "targetSaveFormat");
        if target_save_format.is_empty() {
            bail!("configuration is missing <targetSaveFormat>");
        }

        let mut patterns = Vec::new();
        if let Some(container) = child(&root, "repoUrlPatterns") {
            for node in container.children().filter(|n| n.has_tag_name("pattern")) {
                patterns.push(parse_pattern(&node));
            }
        }
        if patterns.is_empty() {
            bail!("configuration declares no <repoUrlPatterns>/<pattern> entries");
        }

        Ok(Self {
            version,
            report_location,
            report_lines_to_skip,
            target_save_format,
            patterns,
        })
    }
}

fn parse_pattern(node: &Node) -> UrlPattern {
    UrlPattern {
        current_group_format: child_text(node, "currentGroupUrlPattern"),
        future_group_format: child_text(node, "futureGroupUrlPattern"),
        current_artifact_format: child_text(node, "currentArtifactUrlPattern"),
        future_artifact_format: child_text(node, "futureArtifactUrlPattern"),
        current_version_format: child_text(node, "currentVersionUrlPattern"),
        future_version_format: child_text(node, "futureVersionUrlPattern"),
        url_template: child_text(node, "urlPattern"),
        version: child_text(node, "version"),
        use_delivery_report: child_text(node, "useDeliveryReport") != "false",
        group_id: child_text(node, "groupId"),
        artifact: child_text(node, "artifact"),
        component: child_text(node, "component"),
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text(node: &Node, name: &str) -> String {
    child(node, name)
        .and_then(|n| n.text())
        .unwrap_or_default()
        .trim()
        .to_string()
}
