// src/pipeline/build.rs

//! Database build pipeline: harvest every conference for every year.

use chrono::{Datelike, Local};

use crate::models::{Conference, Config, ConferenceYear};
use crate::services::{BibliographyHarvester, HarvestOutcome};
use crate::storage::PaperStore;

/// Totals of a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub units: usize,
    pub failed_units: usize,
    pub encountered: usize,
    pub saved: usize,
}

/// Every (conference, year) unit from `start_year` through `end_year`,
/// conference-major in priority order.
pub fn build_units(start_year: i32, end_year: i32) -> Vec<ConferenceYear> {
    Conference::ALL
        .into_iter()
        .flat_map(|conference| {
            (start_year..=end_year).map(move |year| ConferenceYear { conference, year })
        })
        .collect()
}

/// Harvest `units` one after another.
///
/// A failing unit is logged and contributes only the papers it counted
/// before failing; the run always continues with the next unit.
pub async fn harvest_units(
    harvester: &BibliographyHarvester,
    store: &dyn PaperStore,
    units: &[ConferenceYear],
    want_abstract: bool,
) -> BuildSummary {
    let mut summary = BuildSummary {
        units: units.len(),
        ..BuildSummary::default()
    };

    for &unit in units {
        let mut outcome = HarvestOutcome::default();
        let result = harvester
            .harvest_into(store, unit, want_abstract, &mut outcome)
            .await;

        summary.encountered += outcome.encountered;
        summary.saved += outcome.saved;
        if let Err(e) = result {
            summary.failed_units += 1;
            log::warn!(
                "Failed to obtain papers at {unit} ({} saved before the failure): {e}",
                outcome.saved
            );
        }
    }

    summary
}

/// Build the paper database from the configured start year through the
/// current calendar year.
pub async fn run_build(
    config: &Config,
    harvester: &BibliographyHarvester,
    store: &dyn PaperStore,
    want_abstract: bool,
) -> BuildSummary {
    let units = build_units(config.aggregator.start_year, Local::now().year());
    log::info!(
        "Harvesting {} conference-years{}...",
        units.len(),
        if want_abstract { " with abstracts" } else { "" }
    );

    let summary = harvest_units(harvester, store, &units, want_abstract).await;

    log::info!(
        "Build complete: {} papers seen, {} newly saved, {}/{} units failed",
        summary.encountered,
        summary.saved,
        summary.failed_units,
        summary.units
    );
    summary
}
