// SPDX-License-Identifier: Apache-2.0

//! Optional post-assembly comparison of generated targets against their
//! originals, behind the `-c` flag. Purely informational.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::assemble::component_name;
use crate::models::target::Target;

/// Logs a per-target summary: location counts and the unit ids present in the
/// input but missing from the generated output.
pub(crate) fn compare_targets(generated: &BTreeMap<String, Target>, inputs: &[Target]) {
    for (file_name, output) in generated {
        let component = component_name(&output.name);
        let Some(input) = inputs
            .iter()
            .find(|t| component_name(&t.name) == component)
        else {
            warn!("{file_name}: no input target matches component {component}");
            continue;
        };

        info!(
            "{file_name}: {} of {} locations survived",
            output.locations.len(),
            input.locations.len()
        );

        let dropped = dropped_unit_ids(input, output);
        if dropped.is_empty() {
            info!("{file_name}: every input unit id is present in the output");
        } else {
            for id in dropped {
                warn!("{file_name}: unit {id} from {} was dropped", input.name);
            }
        }
    }
}

fn dropped_unit_ids(input: &Target, output: &Target) -> Vec<String> {
    let kept: BTreeSet<&str> = output
        .locations
        .iter()
        .flat_map(|l| l.units.iter())
        .map(|u| u.id.as_str())
        .collect();
    input
        .locations
        .iter()
        .flat_map(|l| l.units.iter())
        .filter(|u| !kept.contains(u.id.as_str()))
        .map(|u| u.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::target::{Location, Unit};

    fn target_with_units(name: &str, ids: &[&str]) -> Target {
        Target {
            name: name.to_string(),
            locations: vec![Location {
                repository: "https://example.org/".to_string(),
                units: ids
                    .iter()
                    .map(|id| Unit { id: id.to_string(), version: "1.0".to_string() })
                    .collect(),
                ..Location::default()
            }],
            ..Target::default()
        }
    }

    #[test]
    fn finds_units_missing_from_the_output() {
        let input = target_with_units("app_1.0.0", &["a", "b", "c"]);
        let output = target_with_units("app_2.0.0", &["a", "c"]);
        assert_eq!(dropped_unit_ids(&input, &output), vec!["b".to_string()]);
    }

    #[test]
    fn no_drops_when_outputs_cover_inputs() {
        let input = target_with_units("app_1.0.0", &["a"]);
        let output = target_with_units("app_2.0.0", &["a", "extra"]);
        assert!(dropped_unit_ids(&input, &output).is_empty());
    }
}
