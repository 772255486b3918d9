// SPDX-License-Identifier: Apache-2.0

//! Reconstructs output targets from the input targets, the component repo map
//! and the fetched unit catalogs.

use std::collections::{BTreeMap, HashMap};

use tracing::{error, warn};

use crate::matcher::{PLACEHOLDER_COMPONENT, PLACEHOLDER_VERSION};
use crate::models::repo::{CatalogUnit, RepoData, strip_archive_suffix};
use crate::models::target::{Location, Plugin, Target, Unit};
use crate::repo_map::ComponentRepoMap;
use crate::report::ReportStore;

const COMPONENT_DELIMITER: char = '_';
const TARGET_FILE_SUFFIX: &str = ".target";

/// Builds one output target per input target, keyed by the output file name
/// derived from the save-format template. Structural fields are copied
/// verbatim; locations and units are rewritten against the resolved
/// repositories and their catalogs. Targets whose location list ends up empty
/// are still emitted.
pub(crate) fn assemble(
    input_targets: &[Target],
    repo_map: &ComponentRepoMap,
    units_by_repo: &HashMap<RepoData, Vec<CatalogUnit>>,
    records: &ReportStore,
    version: &str,
    save_format: &str,
) -> BTreeMap<String, Target> {
    let mut outputs = BTreeMap::new();
    for input in input_targets {
        let component = component_name(&input.name);
        let file_name = format!(
            "{}{TARGET_FILE_SUFFIX}",
            format_target_name(save_format, component, version)
        );
        let output = Target {
            name: format!("{component}{COMPONENT_DELIMITER}{version}"),
            include_mode: input.include_mode.clone(),
            sequence_number: input.sequence_number.clone(),
            launcher_args: input.launcher_args.clone(),
            target_jre: input.target_jre.clone(),
            environment: input.environment.clone(),
            locations: assemble_locations(input, repo_map, units_by_repo, records),
            include_bundles: assemble_include_bundles(input, units_by_repo),
        };
        if outputs.contains_key(&file_name) {
            warn!(
                "{file_name} is produced by more than one input target; keeping the one from {}",
                input.name
            );
        }
        outputs.insert(file_name, output);
    }
    outputs
}

/// The part of a target name before the first underscore.
pub(crate) fn component_name(target_name: &str) -> &str {
    target_name
        .split(COMPONENT_DELIMITER)
        .next()
        .unwrap_or(target_name)
}

/// Applies `$COMPONENT$` and `$VERSION$` to a name template.
pub(crate) fn format_target_name(template: &str, component: &str, version: &str) -> String {
    template
        .replace(PLACEHOLDER_COMPONENT, component)
        .replace(PLACEHOLDER_VERSION, version)
}

fn assemble_locations(
    input: &Target,
    repo_map: &ComponentRepoMap,
    units_by_repo: &HashMap<RepoData, Vec<CatalogUnit>>,
    records: &ReportStore,
) -> Vec<Location> {
    let Some(by_url) = repo_map.get(&input.name) else {
        error!("no repository map entry for target {}", input.name);
        return Vec::new();
    };

    let mut locations = Vec::new();
    for location in &input.locations {
        let lookup = strip_archive_suffix(&location.repository);
        let Some(repo) = by_url.get(&lookup) else {
            error!(
                "no resolved repository for location {} in target {}",
                location.repository, input.name
            );
            continue;
        };
        // A map entry without report backing must not survive into the output.
        if !records.contains_key(&repo.coordinate_key()) {
            error!(
                "no delivery record backs resolved repository {}:{}:{}",
                repo.group, repo.artifact, repo.version
            );
            continue;
        }
        locations.push(assemble_location(location, repo, units_by_repo));
    }
    locations
}

fn assemble_location(
    input: &Location,
    repo: &RepoData,
    units_by_repo: &HashMap<RepoData, Vec<CatalogUnit>>,
) -> Location {
    let catalog = units_by_repo.get(repo).map(Vec::as_slice).unwrap_or(&[]);
    // The catalog decides each surviving unit's version.
    let units = input
        .units
        .iter()
        .filter_map(|unit| {
            catalog.iter().find(|cu| cu.id == unit.id).map(|cu| Unit {
                id: cu.id.clone(),
                version: cu.version.clone(),
            })
        })
        .collect();
    Location {
        include_mode: input.include_mode.clone(),
        location_type: input.location_type.clone(),
        include_all_platforms: input.include_all_platforms.clone(),
        include_configure_phase: input.include_configure_phase.clone(),
        repository: strip_archive_suffix(&repo.location),
        units,
    }
}

fn assemble_include_bundles(
    input: &Target,
    units_by_repo: &HashMap<RepoData, Vec<CatalogUnit>>,
) -> Option<Vec<Plugin>> {
    let plugins = input.include_bundles.as_ref()?;
    if plugins.is_empty() {
        return None;
    }
    let index = unit_index(units_by_repo);
    let rewritten = plugins
        .iter()
        .filter_map(|plugin| {
            index.get(plugin.id.as_str()).map(|unit| Plugin {
                id: unit.id.clone(),
                version: plugin.version.as_ref().map(|_| unit.version.clone()),
            })
        })
        .collect();
    Some(rewritten)
}

/// Folds every repository's catalog into a single id -> unit index.
/// Repositories are visited in coordinate order so id collisions resolve to
/// the lexicographically last repository, deterministically.
fn unit_index(
    units_by_repo: &HashMap<RepoData, Vec<CatalogUnit>>,
) -> HashMap<&str, &CatalogUnit> {
    let mut repos: Vec<&RepoData> = units_by_repo.keys().collect();
    repos.sort_by(|a, b| {
        (&a.group, &a.artifact, &a.version).cmp(&(&b.group, &b.artifact, &b.version))
    });

    let mut index = HashMap::new();
    for repo in repos {
        for unit in &units_by_repo[repo] {
            index.insert(unit.id.as_str(), unit);
        }
    }
    index
}
