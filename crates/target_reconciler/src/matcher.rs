// SPDX-License-Identifier: Apache-2.0

use crate::models::config::UrlPattern;
use crate::models::report::DeliveryRecord;

pub(crate) const PLACEHOLDER_GROUP: &str = "$GROUP$";
pub(crate) const PLACEHOLDER_ARTIFACT: &str = "$ARTIFACT$";
pub(crate) const PLACEHOLDER_VERSION: &str = "$VERSION$";
pub(crate) const PLACEHOLDER_COMPONENT: &str = "$COMPONENT$";

/// A successful pattern match: the winning pattern and the fully substituted
/// repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternMatch<'a> {
    pub pattern: &'a UrlPattern,
    pub new_url: String,
}

/// Tests a delivery record against an existing repository URL. Patterns are
/// tried in declaration order; the first match wins. Pure: repeated calls on
/// the same inputs always yield the same result.
pub(crate) fn match_location<'a>(
    record: &DeliveryRecord,
    input_url: &str,
    patterns: &'a [UrlPattern],
) -> Option<PatternMatch<'a>> {
    patterns
        .iter()
        .find_map(|pattern| match_pattern(record, input_url, pattern))
}

fn match_pattern<'a>(
    record: &DeliveryRecord,
    input_url: &str,
    pattern: &'a UrlPattern,
) -> Option<PatternMatch<'a>> {
    let group = reformat(&record.group, &pattern.current_group_format, &pattern.future_group_format);
    let artifact = reformat(
        &record.artifact,
        &pattern.current_artifact_format,
        &pattern.future_artifact_format,
    );
    if !input_url.contains(&group) || !input_url.contains(&artifact) {
        return None;
    }

    // External records resolve only through their own pinned-version pattern;
    // report-derived records only through unpinned report-driven patterns.
    let gate = if record.external_entry {
        !pattern.use_delivery_report && pattern.version == record.version
    } else {
        pattern.use_delivery_report && pattern.version.is_empty()
    };
    if !gate {
        return None;
    }

    let version = reformat(
        &record.version,
        &pattern.current_version_format,
        &pattern.future_version_format,
    );
    let new_url = pattern
        .url_template
        .replace(PLACEHOLDER_GROUP, &group)
        .replace(PLACEHOLDER_ARTIFACT, &artifact)
        .replace(PLACEHOLDER_VERSION, &version);

    // The substituted prefix up to $VERSION$ must occur in the old URL, so a
    // record that merely shares group/artifact substrings with an unrelated
    // repository cannot match.
    if let Some(idx) = pattern.url_template.find(PLACEHOLDER_VERSION) {
        let prefix = pattern.url_template[..idx]
            .replace(PLACEHOLDER_GROUP, &group)
            .replace(PLACEHOLDER_ARTIFACT, &artifact);
        if !input_url.contains(&prefix) {
            return None;
        }
    }

    Some(PatternMatch { pattern, new_url })
}

/// Literal substring replacement, e.g. "." -> "/" to turn a dotted coordinate
/// into path segments. An empty current format leaves the value untouched.
fn reformat(value: &str, current: &str, future: &str) -> String {
    if current.is_empty() {
        value.to_string()
    } else {
        value.replace(current, future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(group: &str, artifact: &str, version: &str, external: bool) -> DeliveryRecord {
        DeliveryRecord {
            status: "ok".to_string(),
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            classifier: String::new(),
            extension: String::new(),
            external_entry: external,
        }
    }

    fn dotted_pattern(template: &str) -> UrlPattern {
        UrlPattern {
            current_group_format: ".".to_string(),
            future_group_format: "/".to_string(),
            current_artifact_format: ".".to_string(),
            future_artifact_format: "/".to_string(),
            url_template: template.to_string(),
            use_delivery_report: true,
            ..UrlPattern::default()
        }
    }

    #[test]
    fn matches_egit_location_and_builds_new_url() {
        let record = record("org.eclipse.egit", "org.eclipse.egit", "6.7.0", false);
        let mut pattern = dotted_pattern("https://example.org/$GROUP$/$ARTIFACT$/$VERSION$/");
        // The old URL spells group and artifact dotted, so the pattern keeps
        // the coordinates verbatim instead of reformatting into segments.
        pattern.current_group_format = String::new();
        pattern.current_artifact_format = String::new();
        let input = "https://example.org/org.eclipse.egit/org.eclipse.egit/6.6.0/content.jar";

        let result = match_location(&record, input, std::slice::from_ref(&pattern))
            .expect("pattern should match");
        assert_eq!(
            result.new_url,
            "https://example.org/org.eclipse.egit/org.eclipse.egit/6.7.0/"
        );
    }

    #[test]
    fn reformats_group_into_path_segments() {
        let record = record("org.eclipse.egit", "egit", "6.7.0", false);
        let pattern = dotted_pattern("https://example.org/$GROUP$/$ARTIFACT$/$VERSION$/");
        let input = "https://example.org/org/eclipse/egit/egit/6.6.0/";
        let result = match_location(&record, input, std::slice::from_ref(&pattern))
            .expect("segmented group should match");
        assert_eq!(result.new_url, "https://example.org/org/eclipse/egit/egit/6.7.0/");
    }

    #[test]
    fn is_deterministic() {
        let record = record("org.eclipse.egit", "egit", "6.7.0", false);
        let pattern = dotted_pattern("https://example.org/$GROUP$/$ARTIFACT$/$VERSION$/");
        let input = "https://example.org/org/eclipse/egit/egit/6.6.0/";
        let first = match_location(&record, input, std::slice::from_ref(&pattern));
        let second = match_location(&record, input, std::slice::from_ref(&pattern));
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_url_without_group_or_artifact() {
        let record = record("org.eclipse.egit", "egit", "6.7.0", false);
        let pattern = dotted_pattern("https://example.org/$GROUP$/$ARTIFACT$/$VERSION$/");
        let input = "https://old.example.org/org/eclipse/platform/4.30/";
        assert!(match_location(&record, input, std::slice::from_ref(&pattern)).is_none());
    }

    #[test]
    fn report_record_rejects_pinned_pattern() {
        let record = record("org.eclipse.egit", "egit", "6.7.0", false);
        let mut pattern = dotted_pattern("https://example.org/$GROUP$/$ARTIFACT$/$VERSION$/");
        pattern.version = "6.7.0".to_string();
        let input = "https://example.org/org/eclipse/egit/egit/6.6.0/";
        assert!(match_location(&record, input, std::slice::from_ref(&pattern)).is_none());
    }

    #[test]
    fn external_record_requires_matching_pinned_version() {
        let record = record("org.eclipse.orbit", "orbit", "2.31.0", true);
        let mut pattern = dotted_pattern("https://example.org/$GROUP$/$ARTIFACT$/$VERSION$/");
        pattern.use_delivery_report = false;
        pattern.version = "2.31.0".to_string();
        let input = "https://example.org/org/eclipse/orbit/orbit/2.30.0/";

        let result = match_location(&record, input, std::slice::from_ref(&pattern));
        assert!(result.is_some());

        pattern.version = "2.30.0".to_string();
        assert!(match_location(&record, input, std::slice::from_ref(&pattern)).is_none());
    }

    #[test]
    fn external_record_rejects_report_driven_pattern() {
        let record = record("org.eclipse.orbit", "orbit", "2.31.0", true);
        let mut pattern = dotted_pattern("https://example.org/$GROUP$/$ARTIFACT$/$VERSION$/");
        pattern.version = "2.31.0".to_string();
        // use_delivery_report stays true: an external record must not match.
        let input = "https://example.org/org/eclipse/orbit/orbit/2.30.0/";
        assert!(match_location(&record, input, std::slice::from_ref(&pattern)).is_none());
    }

    #[test]
    fn prefix_guard_rejects_coincidental_substring_match() {
        let record = record("org.eclipse.egit", "egit", "6.7.0", false);
        let pattern = dotted_pattern("https://mirrors.example.org/p2/$GROUP$/$ARTIFACT$/$VERSION$/");
        // Group and artifact segments occur, but not under the template host.
        let input = "https://old.example.org/org/eclipse/egit/6.7.0/";
        assert!(match_location(&record, input, std::slice::from_ref(&pattern)).is_none());
    }

    #[test]
    fn first_matching_pattern_wins() {
        let record = record("org.eclipse.egit", "egit", "6.7.0", false);
        // Neither template carries $VERSION$, so the prefix guard does not
        // apply and declaration order alone decides.
        let first = dotted_pattern("https://first.example.org/$GROUP$/$ARTIFACT$/");
        let second = dotted_pattern("https://second.example.org/$GROUP$/$ARTIFACT$/");
        let input = "https://second.example.org/org/eclipse/egit/6.7.0/";

        let patterns = [first, second];
        let result = match_location(&record, input, &patterns).expect("should match");
        assert_eq!(
            result.new_url,
            "https://first.example.org/org/eclipse/egit/egit/"
        );
    }
}
