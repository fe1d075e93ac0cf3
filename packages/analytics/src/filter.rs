//! Year/region filtering.

use casewatch_analytics_models::FilterSelection;
use casewatch_dataset_models::Dataset;

/// Returns the records of `dataset` that pass `selection`, in source order.
///
/// The input is untouched. Filtering a filtered dataset again with the same
/// selection returns an equal dataset.
#[must_use]
pub fn filter(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    if selection.is_unconstrained() {
        return dataset.clone();
    }

    let filtered: Dataset = dataset
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();

    log::debug!(
        "Filtered {} -> {} records (years={:?}, regions={:?})",
        dataset.len(),
        filtered.len(),
        selection.years,
        selection.regions
    );

    filtered
}
