use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use mealgrid_plan::grid::SlotId;
use mealgrid_plan::site;
use mealgrid_plan::slot::PlanState;
use mealgrid_shared::staging::dest_with_source_ext;
use mealgrid_shared::{MediaSource, StageOutcome, TempArea};

use crate::collab::{Archiver, Clipboard, ClipboardReader, CopyArchiver, FileClipboard};
use crate::collab::{DirectoryOpener, SystemOpener};
use crate::config::Config;

/// Which slot element a clipboard paste feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PasteTarget {
    Photo,
    Recipe,
}

/// Finalizes the grid from config, creates the site structure and emits the
/// initial artifacts with placeholder names.
#[tracing::instrument(skip(config))]
pub fn init(config: &Config) -> Result<()> {
    let grid = config.grid();
    let state = PlanState::new(grid);
    let site_root = config.site_root();

    fs::create_dir_all(site_root)
        .with_context(|| format!("could not create {}", site_root.display()))?;
    site::write_site(
        site_root,
        &site::render(&state.grid, &state.slots, &config.settings()),
    )?;
    save_state(&state, site_root);

    println!(
        "Initialized plan at {}: {} categories, {} slots",
        site_root.display(),
        state.grid.categories().len(),
        state.grid.total_slots()
    );
    Ok(())
}

/// One slot edit from the command line. Unset fields are left alone.
#[derive(Debug, Default)]
pub struct SlotEdit {
    pub name: Option<String>,
    pub empty: Option<bool>,
    pub photo: Option<String>,
    pub recipe: Option<String>,
}

#[tracing::instrument(skip(config, edit))]
pub fn slot_set(config: &Config, id: u32, edit: SlotEdit) -> Result<()> {
    let site_root = config.site_root();
    let mut state = PlanState::load(site_root)?;
    let id = SlotId(id);

    if let Some(name) = edit.name {
        state.slots.set_name(id, name)?;
    }
    if let Some(empty) = edit.empty {
        state.slots.set_empty(id, empty)?;
    }
    if let Some(token) = edit.photo {
        state.slots.set_photo(id, MediaSource::parse(&token))?;
    }
    if let Some(token) = edit.recipe {
        state.slots.set_recipe(id, MediaSource::parse(&token))?;
    }

    save_state(&state, site_root);
    println!("Updated slot {id}");
    Ok(())
}

/// Takes the clipboard collaborator's content into a slot: a path becomes
/// the media source directly, raw image bytes are materialized in the temp
/// staging area first.
#[tracing::instrument(skip(config))]
pub fn slot_paste(
    config: &Config,
    id: u32,
    target: PasteTarget,
    from: Option<PathBuf>,
) -> Result<()> {
    let site_root = config.site_root();
    let mut state = PlanState::load(site_root)?;
    let id = SlotId(id);

    let source = match FileClipboard::new(from).read() {
        Clipboard::Path(path) => path,
        Clipboard::Image(bytes) => {
            if target == PasteTarget::Recipe {
                println!("Clipboard holds image data, which cannot become a recipe document");
                return Ok(());
            }
            TempArea::new(site_root).store_image(&bytes)?
        }
        Clipboard::Empty => {
            println!("Clipboard is empty, nothing changed");
            return Ok(());
        }
    };

    match target {
        PasteTarget::Photo => state.slots.set_photo(id, MediaSource::Present(source))?,
        PasteTarget::Recipe => state.slots.set_recipe(id, MediaSource::Present(source))?,
    }
    save_state(&state, site_root);
    println!("Pasted clipboard content into slot {id}");
    Ok(())
}

pub fn slot_list(config: &Config) -> Result<()> {
    let state = PlanState::load(config.site_root())?;
    println!("{:>5}  {:<24} {:>5}  {:<10} {}", "slot", "name", "empty", "photo", "recipe");
    for (id, slot) in state.slots.iter() {
        println!(
            "{:>5}  {:<24} {:>5}  {:<10} {}",
            id.to_string(),
            slot.name,
            if slot.empty { "yes" } else { "" },
            media_summary(&slot.photo),
            media_summary(&slot.recipe),
        );
    }
    Ok(())
}

fn media_summary(media: &MediaSource) -> String {
    match media {
        MediaSource::Present(path) => path.display().to_string(),
        MediaSource::Suppressed => "(hidden)".to_owned(),
        MediaSource::Unset => String::new(),
    }
}

/// Regenerates the site artifacts from the stored plan state. All pending
/// attribute edits are already in the store, so the markup reflects them.
#[tracing::instrument(skip(config))]
pub fn render(config: &Config) -> Result<()> {
    let site_root = config.site_root();
    let state = PlanState::load(site_root)?;
    site::write_site(
        site_root,
        &site::render(&state.grid, &state.slots, &config.settings()),
    )?;
    println!("Rendered site at {}", site_root.display());
    Ok(())
}

#[derive(Debug, Default)]
pub struct FinishArgs {
    /// Source document for the "full ingredients list" download link.
    pub full_list: Option<PathBuf>,
    /// Source document for the "per dish" download link.
    pub per_dish: Option<PathBuf>,
    /// Export the finished site to this directory.
    pub archive: Option<PathBuf>,
}

/// The commit step: re-render with the latest edits, stage every pending
/// media source into its canonical destination, patch photo extensions,
/// purge clipboard temp files, then optionally rename and export.
#[tracing::instrument(skip(config, args))]
pub fn finish(config: &Config, args: FinishArgs) -> Result<()> {
    let mut site_root = config.site_root().to_path_buf();
    let mut state = PlanState::load(&site_root)?;

    // Edits must be fully applied before emission; the emitter only ever
    // sees the store.
    site::write_site(
        &site_root,
        &site::render(&state.grid, &state.slots, &config.settings()),
    )?;

    let pipeline = config.pipeline();
    let snapshot: Vec<_> = state
        .slots
        .iter()
        .map(|(id, slot)| (id, slot.clone()))
        .collect();

    for (id, slot) in snapshot {
        // Empty slots render a placeholder; their picked files stay put.
        if state.slots.is_effectively_empty(id) {
            continue;
        }

        let dest = site::recipe_dest(&site_root, id);
        match pipeline.stage_media(&slot.recipe, &dest)? {
            StageOutcome::Staged { dest, downgraded } => {
                warn_if_downgraded(downgraded, id);
                state.slots.record_staged_recipe(id, dest)?;
            }
            StageOutcome::MissingSource => {
                println!("Slot {id}: recipe source missing, skipped");
            }
            _ => {}
        }

        let default_dest = site::photo_dest(&site_root, id);
        let dest = match slot.photo.path() {
            Some(source) => dest_with_source_ext(&default_dest, source),
            None => default_dest,
        };
        match pipeline.stage_media(&slot.photo, &dest)? {
            StageOutcome::Staged { dest, downgraded } => {
                warn_if_downgraded(downgraded, id);
                if let Some(ext) = dest.extension().and_then(|e| e.to_str()) {
                    site::patch_photo_extension(&site_root, id, ext)?;
                }
                state.slots.record_staged_photo(id, dest)?;
            }
            StageOutcome::MissingSource => {
                println!("Slot {id}: photo source missing, skipped");
            }
            _ => {}
        }
    }

    if config.settings().source_links.is_some() {
        stage_ingredient_doc(config, &site_root, args.full_list, site::INGREDIENTS_FULL_LIST)?;
        stage_ingredient_doc(config, &site_root, args.per_dish, site::INGREDIENTS_PER_DISH)?;
    }

    // Clipboard temps are duplicates once copy-mode staging committed; in
    // move mode this clears stale picks the user replaced before finishing.
    TempArea::new(&site_root).purge();
    save_state(&state, &site_root);

    if config.files.rename_subfolder {
        site_root = rename_site_dir(config, site_root);
    }

    if let Some(dest) = args.archive {
        CopyArchiver.pack(&site_root, &dest)?;
        println!("Exported site to {}", dest.display());
    }

    println!("Meal plan finished at {}", site_root.display());
    Ok(())
}

fn warn_if_downgraded(downgraded: bool, id: SlotId) {
    if downgraded {
        println!("Slot {id}: source belongs to the meal library, copied instead of moved");
    }
}

fn stage_ingredient_doc(
    config: &Config,
    site_root: &Path,
    source: Option<PathBuf>,
    file_name: &str,
) -> Result<()> {
    let Some(source) = source else {
        return Ok(());
    };
    let dest = site_root.join("media").join("pdfs").join(file_name);
    if config.pipeline().stage(&source, &dest)? == StageOutcome::MissingSource {
        println!("Ingredient document {} missing, skipped", source.display());
    }
    Ok(())
}

/// Renames the site directory to `Meal plan {start} - {end}` inside its
/// parent. A failure keeps the old directory and is only a warning.
fn rename_site_dir(config: &Config, site_root: PathBuf) -> PathBuf {
    let settings = config.settings();
    let new_name = format!("Meal plan {} - {}", settings.week_start, settings.week_end);
    let new_root = match site_root.parent() {
        Some(parent) => parent.join(new_name),
        None => return site_root,
    };
    if new_root == site_root {
        return site_root;
    }
    match fs::rename(&site_root, &new_root) {
        Ok(()) => {
            println!("Renamed site directory to {}", new_root.display());
            new_root
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not rename site directory");
            site_root
        }
    }
}

/// Opens the generated site in the file manager, or the page itself in the
/// browser.
pub fn open(config: &Config, browser: bool) -> Result<()> {
    let site_root = config.site_root();
    let target = if browser {
        site_root.join("index.html")
    } else {
        site_root.to_path_buf()
    };
    anyhow::ensure!(target.exists(), "{} does not exist, run init first", target.display());
    SystemOpener.open(&target)
}

/// Plan-state writes are reported but never fatal; the in-memory state
/// remains the source of truth for this invocation.
fn save_state(state: &PlanState, site_root: &Path) {
    if let Err(e) = state.save(site_root) {
        tracing::warn!(error = %e, "plan state write failed, edits kept in memory only");
    }
}
