use std::path::PathBuf;

use anyhow::{Context, Result};

use mealgrid_library::{Library, MealInput, SortCriterion};
use mealgrid_plan::grid::SlotId;
use mealgrid_plan::slot::PlanState;

use crate::config::Config;

fn open_library(config: &Config) -> Result<Library> {
    Library::open(config.library_root())
        .with_context(|| format!("could not open meal library at {}", config.library_root().display()))
}

#[tracing::instrument(skip(config, note))]
pub fn add(
    config: &Config,
    name: String,
    note: Option<String>,
    image: Option<PathBuf>,
    document: Option<PathBuf>,
) -> Result<()> {
    let mut library = open_library(config)?;
    let record = library.create(
        MealInput {
            name,
            note: note.unwrap_or_default(),
            image,
            document,
        },
        &config.pipeline(),
    )?;
    println!("Created meal '{}' ({})", record.name, record.id);
    Ok(())
}

/// Unset fields keep their stored value; media fields are re-staged only
/// when the supplied source differs from what the record already holds.
#[tracing::instrument(skip(config, name, note))]
pub fn update(
    config: &Config,
    id: String,
    name: Option<String>,
    note: Option<String>,
    image: Option<PathBuf>,
    document: Option<PathBuf>,
) -> Result<()> {
    let mut library = open_library(config)?;
    let current = library
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("meal record '{id}' not found"))?;

    let input = MealInput {
        name: name.unwrap_or_else(|| current.name.clone()),
        note: note.unwrap_or_else(|| current.note.clone()),
        image,
        document,
    };
    let changes = library.update(&id, input, &config.pipeline())?;
    if changes.is_empty() {
        println!("Nothing changed for '{id}'");
    } else {
        println!("Updated meal '{id}'");
    }
    Ok(())
}

#[tracing::instrument(skip(config))]
pub fn remove(config: &Config, id: String) -> Result<()> {
    let mut library = open_library(config)?;
    library.delete(&id)?;
    println!("Deleted meal '{id}'");
    Ok(())
}

pub fn list(config: &Config, sort: SortCriterion) -> Result<()> {
    let library = open_library(config)?;
    if library.records().is_empty() {
        println!("Meal library is empty");
        return Ok(());
    }
    for record in library.sorted(sort) {
        let media = match (&record.image, &record.document) {
            (Some(_), Some(_)) => "photo+recipe",
            (Some(_), None) => "photo",
            (None, Some(_)) => "recipe",
            (None, None) => "",
        };
        println!("{}  {:<28} {:<14} {}", record.id, record.name, media, record.note);
    }
    Ok(())
}

pub fn search(config: &Config, term: String) -> Result<()> {
    let library = open_library(config)?;
    let hits = library.search(&term);
    if hits.is_empty() {
        println!("No meals match '{term}'");
        return Ok(());
    }
    for record in hits {
        println!("{}  {}", record.id, record.name);
    }
    Ok(())
}

/// Pre-fills a slot from a library record: name plus, where the canonical
/// files exist, photo and recipe sources pointing into the library (which
/// the staging pipeline will copy, never move).
#[tracing::instrument(skip(config))]
pub fn use_record(config: &Config, id: String, slot: u32) -> Result<()> {
    let site_root = config.site_root();
    let mut state = PlanState::load(site_root)?;
    let mut library = open_library(config)?;

    library.resolve_into_slot(&id, &mut state.slots, SlotId(slot))?;

    if let Err(e) = state.save(site_root) {
        tracing::warn!(error = %e, "plan state write failed, edits kept in memory only");
    }
    println!("Filled slot {slot} from meal '{id}'");
    Ok(())
}
