//! Interactive session.
//!
//! Loads one source, lets the user narrow it with year and region
//! multiselects, then offers the same views as the subcommands until the
//! user quits.

use casewatch_analytics::{
    aggregate_by_region, aggregate_by_year, available_regions, available_years, filter,
    sort_most_recent_first, top_with_remainder,
};
use casewatch_analytics_models::FilterSelection;
use casewatch_cli_utils::{MultiProgress, prompt_optional_usize, select_all_by_default};
use casewatch_context::{ContextBudget, build_request_text};
use casewatch_dataset_models::Dataset;
use casewatch_source::SourceDefinition;
use dialoguer::{Input, Select};

use crate::commands;

/// Actions offered once a filter is chosen.
enum Action {
    Metrics,
    YearTotals,
    RegionTotals,
    Records,
    Context,
    Ask,
    ChangeFilter,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Metrics,
        Self::YearTotals,
        Self::RegionTotals,
        Self::Records,
        Self::Context,
        Self::Ask,
        Self::ChangeFilter,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Metrics => "Show metrics",
            Self::YearTotals => "Totals per year",
            Self::RegionTotals => "Totals per region",
            Self::Records => "Browse records",
            Self::Context => "Preview question context",
            Self::Ask => "Ask a question",
            Self::ChangeFilter => "Change filter",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive session over `source`.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded or a prompt fails.
/// Failed questions are reported and the session continues.
pub async fn run(
    multi: &MultiProgress,
    source: &SourceDefinition,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Casewatch");
    println!();

    let dataset = commands::load_dataset(multi, source).await?;
    println!("Loaded {} records from {}", dataset.len(), source.name);

    let budget = ContextBudget::default();
    let mut filtered = prompt_filter(&dataset)?;
    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        println!();
        println!("{} of {} records selected", filtered.len(), dataset.len());

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::Metrics => print!("{}", commands::render_metrics(&filtered)),
            Action::YearTotals => print!(
                "{}",
                commands::render_totals("YEAR", &aggregate_by_year(&filtered))
            ),
            Action::RegionTotals => {
                let rows = aggregate_by_region(&filtered);
                let rows = match prompt_optional_usize("Top regions (empty for all)")? {
                    Some(top) => top_with_remainder(rows, top, commands::OTHER_LABEL),
                    None => rows,
                };
                print!("{}", commands::render_totals("REGION", &rows));
            }
            Action::Records => {
                let limit = prompt_optional_usize("Records to show (empty for 20)")?.unwrap_or(20);
                let sorted = sort_most_recent_first(&filtered);
                print!("{}", commands::render_records(sorted.head(limit)));
            }
            Action::Context => {
                print!("{}", build_request_text(&filtered, &budget, ""));
            }
            Action::Ask => {
                let question: String = Input::new().with_prompt("Question").interact_text()?;
                match commands::ask_question(&filtered, &budget, &question).await {
                    Ok(outcome) => print!("{}", commands::render_answer(&outcome)),
                    Err(e) => log::error!("Question failed: {e}"),
                }
            }
            Action::ChangeFilter => filtered = prompt_filter(&dataset)?,
            Action::Quit => break,
        }
    }

    Ok(())
}

fn prompt_filter(dataset: &Dataset) -> Result<Dataset, dialoguer::Error> {
    let years: Vec<String> = available_years(dataset)
        .iter()
        .map(ToString::to_string)
        .collect();
    let chosen_years = select_all_by_default("Years", &years)?;

    let regions = available_regions(dataset);
    let chosen_regions = select_all_by_default("Regions", &regions)?;

    Ok(filter_by_choices(
        dataset,
        &years,
        &chosen_years,
        &regions,
        &chosen_regions,
    ))
}

/// Filters `dataset` by multiselect choices.
///
/// Keeping every option of a dimension leaves it unconstrained, so records
/// without a year stay in the default "everything selected" view.
/// Deselecting every option of a dimension selects no records.
fn filter_by_choices(
    dataset: &Dataset,
    all_years: &[String],
    chosen_years: &[String],
    all_regions: &[String],
    chosen_regions: &[String],
) -> Dataset {
    match selection_from_choices(all_years, chosen_years, all_regions, chosen_regions) {
        Some(selection) => filter(dataset, &selection),
        None => Dataset::default(),
    }
}

/// `None` when a dimension with options had all of them deselected.
fn selection_from_choices(
    all_years: &[String],
    chosen_years: &[String],
    all_regions: &[String],
    chosen_regions: &[String],
) -> Option<FilterSelection> {
    let years = dimension(all_years, chosen_years)?;
    let regions = dimension(all_regions, chosen_regions)?;

    Some(FilterSelection::new(
        years.iter().filter_map(|y| y.parse().ok()),
        regions,
    ))
}

/// The values to constrain on: empty for "all", `None` for "none".
fn dimension<'a>(all: &[String], chosen: &'a [String]) -> Option<&'a [String]> {
    if chosen.len() == all.len() {
        Some(&[])
    } else if chosen.is_empty() {
        None
    } else {
        Some(chosen)
    }
}
