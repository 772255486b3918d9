// SPDX-License-Identifier: Apache-2.0

//! Builds the per-target map from existing repository URLs to the resolved
//! repositories the output targets will point at.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, error};

use crate::matcher::match_location;
use crate::models::config::UrlPattern;
use crate::models::repo::{RepoData, strip_archive_suffix};
use crate::models::target::Target;
use crate::report::ReportStore;

/// target name -> (old URL, archive suffix stripped) -> resolved repository.
pub(crate) type ComponentRepoMap = BTreeMap<String, BTreeMap<String, RepoData>>;

/// Runs the pattern matcher over every (target, location, record)
/// combination. Records are visited in coordinate order, so when several
/// records match the same old URL the lexicographically last one wins,
/// deterministically. Locations no record matches are logged and left out.
pub(crate) fn build(
    targets: &[Target],
    records: &ReportStore,
    patterns: &[UrlPattern],
) -> ComponentRepoMap {
    let mut map = ComponentRepoMap::new();
    for target in targets {
        let entry = map.entry(target.name.clone()).or_default();
        for location in &target.locations {
            let old_url = &location.repository;
            let mut matched = false;
            for record in records.values() {
                let Some(result) = match_location(record, old_url, patterns) else {
                    continue;
                };
                let mut repo = RepoData {
                    group: record.group.clone(),
                    artifact: record.artifact.clone(),
                    version: record.version.clone(),
                    location: result.new_url,
                };
                repo.normalize_location();
                debug!(
                    "resolved {} -> {} for target {} (pattern component '{}')",
                    old_url, repo.location, target.name, result.pattern.component
                );
                entry.insert(strip_archive_suffix(old_url), repo);
                matched = true;
            }
            if !matched {
                error!(
                    "no delivery record matched location {} in target {}",
                    old_url, target.name
                );
            }
        }
    }
    map
}

/// The distinct set of resolved repositories to fetch, deduplicated by
/// (group, artifact, version).
pub(crate) fn distinct_repos(map: &ComponentRepoMap) -> HashSet<RepoData> {
    map.values()
        .flat_map(|by_url| by_url.values())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::target::Location;
    use crate::report::inject_external_records;

    fn target(name: &str, urls: &[&str]) -> Target {
        Target {
            name: name.to_string(),
            locations: urls
                .iter()
                .map(|url| Location {
                    repository: url.to_string(),
                    ..Location::default()
                })
                .collect(),
            ..Target::default()
        }
    }

    fn record(group: &str, artifact: &str, version: &str) -> crate::models::report::DeliveryRecord {
        crate::models::report::DeliveryRecord {
            status: "ok".to_string(),
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            classifier: String::new(),
            extension: String::new(),
            external_entry: false,
        }
    }

    fn report_pattern() -> UrlPattern {
        UrlPattern {
            current_group_format: ".".to_string(),
            future_group_format: "/".to_string(),
            url_template: "https://repo.example.org/$GROUP$/$ARTIFACT$/$VERSION$/".to_string(),
            use_delivery_report: true,
            ..UrlPattern::default()
        }
    }

    fn store(records: Vec<crate::models::report::DeliveryRecord>) -> ReportStore {
        records.into_iter().map(|r| (r.key(), r)).collect()
    }

    #[test]
    fn builds_map_keyed_by_old_url() {
        let targets = vec![target(
            "app_1.0.0",
            &["https://repo.example.org/org/example/app/1.0.0/"],
        )];
        let records = store(vec![record("org.example", "app", "2.0.0")]);
        let map = build(&targets, &records, &[report_pattern()]);

        let by_url = &map["app_1.0.0"];
        let repo = &by_url["https://repo.example.org/org/example/app/1.0.0/"];
        assert_eq!(repo.group, "org.example");
        assert_eq!(repo.artifact, "app");
        assert_eq!(repo.version, "2.0.0");
        assert_eq!(
            repo.location,
            "https://repo.example.org/org/example/app/2.0.0/content.jar"
        );
    }

    #[test]
    fn unmatched_location_is_dropped() {
        let targets = vec![target(
            "app_1.0.0",
            &[
                "https://repo.example.org/org/example/app/1.0.0/",
                "https://elsewhere.example.org/unrelated/",
            ],
        )];
        let records = store(vec![record("org.example", "app", "2.0.0")]);
        let map = build(&targets, &records, &[report_pattern()]);
        assert_eq!(map["app_1.0.0"].len(), 1);
    }

    #[test]
    fn archive_suffix_is_stripped_from_keys() {
        let targets = vec![target(
            "app_1.0.0",
            &["https://repo.example.org/org/example/app/1.0.0/content.jar"],
        )];
        let records = store(vec![record("org.example", "app", "2.0.0")]);
        let map = build(&targets, &records, &[report_pattern()]);
        assert!(map["app_1.0.0"].contains_key("https://repo.example.org/org/example/app/1.0.0/"));
    }

    #[test]
    fn last_record_in_key_order_wins_on_double_match() {
        let targets = vec![target(
            "app_1.0.0",
            &["https://repo.example.org/org/example/app/1.0.0/"],
        )];
        // Both records share the group/artifact substrings and template
        // prefix, so both match the single location.
        let records = store(vec![
            record("org.example", "app", "2.0.0"),
            record("org.example", "app", "3.0.0"),
        ]);
        let map = build(&targets, &records, &[report_pattern()]);
        let repo = &map["app_1.0.0"]["https://repo.example.org/org/example/app/1.0.0/"];
        assert_eq!(repo.version, "3.0.0");
    }

    #[test]
    fn external_pattern_resolves_without_report_backing() {
        let targets = vec![target(
            "app_1.0.0",
            &["https://static.example.org/org/eclipse/orbit/orbit/2.30.0/"],
        )];
        let mut records = ReportStore::new();
        let external = UrlPattern {
            current_group_format: ".".to_string(),
            future_group_format: "/".to_string(),
            url_template: "https://static.example.org/$GROUP$/$ARTIFACT$/$VERSION$/".to_string(),
            version: "2.31.0".to_string(),
            use_delivery_report: false,
            group_id: "org.eclipse.orbit".to_string(),
            artifact: "orbit".to_string(),
            component: "orbit".to_string(),
            ..UrlPattern::default()
        };
        inject_external_records(&mut records, std::slice::from_ref(&external));

        let map = build(&targets, &records, &[external]);
        let repo =
            &map["app_1.0.0"]["https://static.example.org/org/eclipse/orbit/orbit/2.30.0/"];
        assert_eq!(repo.version, "2.31.0");
        assert_eq!(
            repo.location,
            "https://static.example.org/org/eclipse/orbit/orbit/2.31.0/content.jar"
        );
    }

    #[test]
    fn distinct_repos_deduplicates_by_coordinate() {
        let targets = vec![
            target("app_1.0.0", &["https://repo.example.org/org/example/app/1.0.0/"]),
            target("lib_1.0.0", &["https://repo.example.org/org/example/app/1.0.0/"]),
        ];
        let records = store(vec![record("org.example", "app", "2.0.0")]);
        let map = build(&targets, &records, &[report_pattern()]);
        assert_eq!(distinct_repos(&map).len(), 1);
    }
}
