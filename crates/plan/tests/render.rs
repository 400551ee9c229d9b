use std::fs;
use std::path::PathBuf;

use mealgrid_plan::grid::{Category, Grid, RowCount, SlotId};
use mealgrid_plan::site::{self, EmptyCellMode, Settings, SourceLinks};
use mealgrid_plan::slot::SlotStore;
use mealgrid_shared::MediaSource;
use temp_dir::TempDir;

fn sample_grid() -> Grid {
    Grid::new(vec![
        Category::new("Breakfast", RowCount::Rows(1)),
        Category::new("Lunch", RowCount::Rows(2)),
    ])
}

fn settings() -> Settings {
    Settings {
        week_start: "05.01.26".to_owned(),
        week_end: "11.01.26".to_owned(),
        empty_cell: EmptyCellMode::Dash,
        show_photos: true,
        source_links: Some(SourceLinks::default()),
    }
}

#[test]
fn rendering_twice_is_byte_identical() {
    let grid = sample_grid();
    let mut store = SlotStore::from_grid(&grid);
    store.set_name(SlotId(6), "Lasagna").unwrap();
    store.set_empty(SlotId(2), true).unwrap();

    let first = site::render(&grid, &store, &settings());
    let second = site::render(&grid, &store, &settings());
    assert_eq!(first, second);
    assert!(!first.html.is_empty());
    assert!(!first.css.is_empty());
}

#[test]
fn emitter_and_store_agree_on_numbering() {
    // The store is initialized day-major, the emitter walks category-major;
    // both must reach the same ids through the one slot_id formula.
    let grid = sample_grid();
    let mut store = SlotStore::from_grid(&grid);
    // Tuesday, Lunch, row 1 is slot 6 per the numbering contract.
    store.set_name(SlotId(6), "MARKER-DISH").unwrap();

    let html = site::render(&grid, &store, &settings()).html;
    assert!(html.contains("MARKER-DISH"));
    assert!(html.contains("media/pdfs/recipe6.pdf"));
    assert!(html.contains("media/photos/photo6.jpg"));
}

#[test]
fn empty_slot_renders_placeholder_only() {
    let grid = sample_grid();
    let mut store = SlotStore::from_grid(&grid);
    store.set_name(SlotId(1), "HIDDEN-NAME").unwrap();
    store.set_empty(SlotId(1), true).unwrap();
    // A sentinel on a media field must not change slot-level emptiness.
    store.set_photo(SlotId(1), MediaSource::Suppressed).unwrap();

    let html = site::render(&grid, &store, &settings()).html;
    assert!(!html.contains("HIDDEN-NAME"));
    assert!(!html.contains("photo1.jpg"));
    assert!(!html.contains("recipe1.pdf"));
    assert!(html.contains("no-food"));

    let mut quiet = settings();
    quiet.empty_cell = EmptyCellMode::None;
    let html = site::render(&grid, &store, &quiet).html;
    assert!(!html.contains("no-food"));
}

#[test]
fn photo_sentinel_suppresses_only_the_photo_element() {
    let grid = sample_grid();
    let mut store = SlotStore::from_grid(&grid);
    store.set_name(SlotId(4), "Goulash").unwrap();
    store.set_photo(SlotId(4), MediaSource::Suppressed).unwrap();

    let html = site::render(&grid, &store, &settings()).html;
    assert!(html.contains("Goulash"));
    assert!(!html.contains("photo4.jpg"));
    assert!(html.contains("recipe4.pdf"));
}

#[test]
fn show_photos_off_drops_every_image() {
    let grid = sample_grid();
    let store = SlotStore::from_grid(&grid);
    let mut s = settings();
    s.show_photos = false;

    let html = site::render(&grid, &store, &s).html;
    assert!(!html.contains("<img"));
}

#[test]
fn category_label_appears_once_per_block() {
    let grid = sample_grid();
    let store = SlotStore::from_grid(&grid);
    let html = site::render(&grid, &store, &settings()).html;
    assert_eq!(html.matches(">Lunch</th>").count(), 1);
    assert_eq!(html.matches(">Breakfast</th>").count(), 1);
}

#[test]
fn source_links_box_is_optional() {
    let grid = sample_grid();
    let store = SlotStore::from_grid(&grid);

    let with_links = site::render(&grid, &store, &settings()).html;
    assert!(with_links.contains("ingredients-full-list.pdf"));
    assert!(with_links.contains("ingredients-separated-by-dish.pdf"));
    assert!(with_links.contains("Full ingredients list"));

    let mut s = settings();
    s.source_links = None;
    let without = site::render(&grid, &store, &s).html;
    assert!(!without.contains("pdf-links-container"));
}

#[test]
fn staged_photo_extension_flows_into_markup() {
    let grid = sample_grid();
    let mut store = SlotStore::from_grid(&grid);
    store
        .record_staged_photo(SlotId(3), PathBuf::from("media/photos/photo3.png"))
        .unwrap();

    let html = site::render(&grid, &store, &settings()).html;
    assert!(html.contains("media/photos/photo3.png"));
    assert!(!html.contains("photo3.jpg"));
}

#[test]
fn write_site_creates_layout_and_patch_rewrites_extension() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let root = dir.child("site");
    let grid = sample_grid();
    let store = SlotStore::from_grid(&grid);

    site::write_site(&root, &site::render(&grid, &store, &settings()))?;
    assert!(root.join("index.html").exists());
    assert!(root.join("styles.css").exists());
    assert!(root.join("media/photos").is_dir());
    assert!(root.join("media/pdfs").is_dir());

    // Patch slot 1 to .png: only that slot's reference changes.
    assert!(site::patch_photo_extension(&root, SlotId(1), "png")?);
    let html = fs::read_to_string(root.join("index.html"))?;
    assert!(html.contains("photo1.png"));
    assert!(!html.contains("photo1.jpg"));
    assert!(html.contains("photo2.jpg"));

    // Patching again, or patching to the default extension, is a no-op.
    assert!(!site::patch_photo_extension(&root, SlotId(1), "png")?);
    assert!(!site::patch_photo_extension(&root, SlotId(2), "jpg")?);
    Ok(())
}
