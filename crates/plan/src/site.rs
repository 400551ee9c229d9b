use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use mealgrid_shared::{Error, Result};

use crate::grid::{Grid, SlotId, DAYS};
use crate::slot::SlotStore;

/// Fixed-name ingredient documents linked from the optional sources box.
pub const INGREDIENTS_FULL_LIST: &str = "ingredients-full-list.pdf";
pub const INGREDIENTS_PER_DISH: &str = "ingredients-separated-by-dish.pdf";

const DEFAULT_PHOTO_EXT: &str = "jpg";

/// What an effectively-empty slot shows: a dash glyph or nothing at all.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmptyCellMode {
    #[default]
    Dash,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLinks {
    pub full_list_label: String,
    pub per_dish_label: String,
}

impl Default for SourceLinks {
    fn default() -> Self {
        Self {
            full_list_label: "Full ingredients list".to_owned(),
            per_dish_label: "Ingredients separated by dish".to_owned(),
        }
    }
}

/// Everything the emitter needs beyond grid and store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub week_start: String,
    pub week_end: String,
    pub empty_cell: EmptyCellMode,
    pub show_photos: bool,
    /// `Some` renders the download-links box with these labels.
    pub source_links: Option<SourceLinks>,
}

impl Default for Settings {
    fn default() -> Self {
        let (week_start, week_end) = crate::grid::current_week_range();
        Self {
            week_start,
            week_end,
            empty_cell: EmptyCellMode::Dash,
            show_photos: true,
            source_links: Some(SourceLinks::default()),
        }
    }
}

/// The two derived site files. Purely a function of its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteArtifacts {
    pub html: String,
    pub css: String,
}

struct PhotoView {
    src: String,
    alt: String,
}

struct CellView {
    empty: bool,
    dash: bool,
    name: String,
    photo: Option<PhotoView>,
    recipe: Option<String>,
}

struct RowView {
    label: String,
    cells: Vec<CellView>,
}

#[derive(Template)]
#[template(path = "plan.html")]
struct PlanTemplate<'a> {
    week_range: String,
    days: &'static [&'static str; 7],
    rows: Vec<RowView>,
    source_links: &'a Option<SourceLinks>,
}

/// Canonical photo destination for a slot, with the generator's default
/// extension. The actual extension may differ after staging.
pub fn photo_dest(site_root: &Path, id: SlotId) -> PathBuf {
    site_root
        .join("media")
        .join("photos")
        .join(format!("photo{id}.{DEFAULT_PHOTO_EXT}"))
}

/// Canonical recipe destination for a slot. Recipes are always PDFs.
pub fn recipe_dest(site_root: &Path, id: SlotId) -> PathBuf {
    site_root
        .join("media")
        .join("pdfs")
        .join(format!("recipe{id}.pdf"))
}

fn photo_href(id: SlotId, staged: Option<&Path>) -> String {
    let ext = staged
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .unwrap_or(DEFAULT_PHOTO_EXT);
    format!("media/photos/photo{id}.{ext}")
}

/// Renders the site markup and stylesheet from the current plan state.
/// Deterministic: identical inputs yield byte-identical output, so
/// regeneration is idempotent.
pub fn render(grid: &Grid, store: &SlotStore, settings: &Settings) -> SiteArtifacts {
    let dash = settings.empty_cell == EmptyCellMode::Dash;
    let mut rows = Vec::new();

    for (ci, category) in grid.categories().iter().enumerate() {
        for row in 0..category.rows.rows() {
            // The category label appears on the first row of its block only.
            let label = if row == 0 {
                category.name.clone()
            } else {
                String::new()
            };
            let cells = (0..DAYS.len())
                .map(|day| {
                    let id = grid.slot_id(day, ci, row);
                    cell_view(store, settings, id, &category.name, day, dash)
                })
                .collect();
            rows.push(RowView { label, cells });
        }
    }

    let template = PlanTemplate {
        week_range: format!("{} - {}", settings.week_start, settings.week_end),
        days: &DAYS,
        rows,
        source_links: &settings.source_links,
    };

    let html = match template.render() {
        Ok(html) => html,
        // The template has no fallible expressions; this is unreachable in
        // practice but logged rather than panicking.
        Err(e) => {
            tracing::error!(error = %e, "failed to render plan template");
            String::new()
        }
    };

    SiteArtifacts {
        html,
        css: include_str!("../templates/styles.css").to_owned(),
    }
}

fn cell_view(
    store: &SlotStore,
    settings: &Settings,
    id: SlotId,
    category: &str,
    day: usize,
    dash: bool,
) -> CellView {
    let slot = match store.get(id) {
        Some(slot) if !store.is_effectively_empty(id) => slot,
        _ => {
            return CellView {
                empty: true,
                dash,
                name: String::new(),
                photo: None,
                recipe: None,
            };
        }
    };
    let photo = (settings.show_photos && !slot.photo.is_suppressed()).then(|| PhotoView {
        src: photo_href(id, slot.staged_photo.as_deref()),
        alt: format!("{} {}", category, DAYS[day]),
    });
    let recipe = (!slot.recipe.is_suppressed()).then(|| format!("media/pdfs/recipe{id}.pdf"));

    CellView {
        empty: false,
        dash,
        name: slot.name.clone(),
        photo,
        recipe,
    }
}

/// Writes `index.html` and `styles.css` and makes sure the canonical media
/// directories exist.
pub fn write_site(site_root: &Path, artifacts: &SiteArtifacts) -> Result<()> {
    for dir in ["media/photos", "media/pdfs"] {
        let path = site_root.join(dir);
        fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
    }
    let html_path = site_root.join("index.html");
    fs::write(&html_path, &artifacts.html).map_err(|e| Error::io(&html_path, e))?;
    let css_path = site_root.join("styles.css");
    fs::write(&css_path, &artifacts.css).map_err(|e| Error::io(&css_path, e))?;
    tracing::info!(root = %site_root.display(), "wrote site artifacts");
    Ok(())
}

/// Rewrites the emitted markup to reference a photo's real extension.
///
/// This is a textual patch keyed on the slot's default filename
/// (`photo{id}.jpg`), not a re-render. Returns whether anything changed;
/// an already-patched or never-referenced slot is a logged no-op.
pub fn patch_photo_extension(site_root: &Path, id: SlotId, ext: &str) -> Result<bool> {
    if ext.eq_ignore_ascii_case(DEFAULT_PHOTO_EXT) {
        return Ok(false);
    }
    let html_path = site_root.join("index.html");
    let content = fs::read_to_string(&html_path).map_err(|e| Error::io(&html_path, e))?;

    let default_name = format!("photo{id}.{DEFAULT_PHOTO_EXT}");
    if !content.contains(&default_name) {
        tracing::debug!(slot = %id, "no default photo reference to patch");
        return Ok(false);
    }
    let actual_name = format!("photo{id}.{ext}");
    let patched = content.replace(&default_name, &actual_name);
    fs::write(&html_path, patched).map_err(|e| Error::io(&html_path, e))?;
    tracing::info!(slot = %id, ext, "patched photo extension in markup");
    Ok(true)
}
