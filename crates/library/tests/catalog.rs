use std::fs;
use std::path::PathBuf;

use mealgrid_library::{Library, MealInput, SortCriterion};
use mealgrid_plan::grid::{Category, Grid, RowCount, SlotId};
use mealgrid_plan::slot::SlotStore;
use mealgrid_shared::{MediaSource, Pipeline, StageMode};
use temp_dir::TempDir;

fn input(name: &str) -> MealInput {
    MealInput {
        name: name.to_owned(),
        ..MealInput::default()
    }
}

#[test]
fn create_stages_media_under_canonical_names() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let photo = dir.child("holiday-shot.png");
    fs::write(&photo, b"png bytes")?;
    let pdf = dir.child("lasagna.pdf");
    fs::write(&pdf, b"pdf bytes")?;

    let mut library = Library::open(dir.child("library"))?;
    let pipeline = Pipeline::new(StageMode::Copy);
    let record = library.create(
        MealInput {
            name: "Lasagna".to_owned(),
            note: "sunday dinner".to_owned(),
            image: Some(photo.clone()),
            document: Some(pdf),
        },
        &pipeline,
    )?;

    let record_dir = dir.child("library").join(&record.id);
    assert_eq!(record.image.as_deref(), Some(record_dir.join("image.png").as_path()));
    assert_eq!(
        record.document.as_deref(),
        Some(record_dir.join("recipe.pdf").as_path())
    );
    assert!(record_dir.join("image.png").exists());
    assert!(record_dir.join("recipe.pdf").exists());
    // Copy mode: the user's originals survive.
    assert!(photo.exists());
    Ok(())
}

#[test]
fn catalog_round_trips_across_reopen() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let root = dir.child("library");
    let pipeline = Pipeline::new(StageMode::Copy);

    let first_id = {
        let mut library = Library::open(&root)?;
        library.create(input("Pancakes"), &pipeline)?;
        library.create(input("Goulash"), &pipeline)?;
        library.records()[0].id.clone()
    };

    let library = Library::open(&root)?;
    assert_eq!(library.records().len(), 2);
    assert_eq!(library.records()[0].id, first_id);
    assert_eq!(library.records()[0].name, "Pancakes");
    Ok(())
}

#[test]
fn update_with_same_stored_image_does_no_file_operations() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let photo = dir.child("shot.jpg");
    fs::write(&photo, b"original")?;

    let mut library = Library::open(dir.child("library"))?;
    let pipeline = Pipeline::new(StageMode::Copy);
    let record = library
        .create(
            MealInput {
                name: "Soup".to_owned(),
                image: Some(photo),
                ..MealInput::default()
            },
            &pipeline,
        )?
        .clone();
    let canonical = record.image.clone().unwrap();

    // Make a re-stage observable: if the canonical file were rewritten its
    // content would change back to "original".
    fs::write(&canonical, b"tampered")?;

    let changes = library.update(
        record.id.as_str(),
        MealInput {
            name: "Soup".to_owned(),
            image: Some(canonical.clone()),
            ..MealInput::default()
        },
        &pipeline,
    )?;

    assert!(changes.is_empty());
    assert_eq!(fs::read(&canonical)?, b"tampered");
    Ok(())
}

#[test]
fn update_restages_only_a_different_source() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let first = dir.child("first.jpg");
    fs::write(&first, b"first")?;
    let second = dir.child("second.png");
    fs::write(&second, b"second")?;

    let mut library = Library::open(dir.child("library"))?;
    let pipeline = Pipeline::new(StageMode::Copy);
    let id = library
        .create(
            MealInput {
                name: "Curry".to_owned(),
                image: Some(first),
                ..MealInput::default()
            },
            &pipeline,
        )?
        .id
        .clone();

    let changes = library.update(
        &id,
        MealInput {
            name: "Curry".to_owned(),
            image: Some(second),
            ..MealInput::default()
        },
        &pipeline,
    )?;

    assert!(changes.image.is_some());
    let record = library.get(&id).unwrap();
    // Extension follows the new source.
    assert_eq!(
        record.image.as_deref().and_then(|p| p.extension()),
        Some(std::ffi::OsStr::new("png"))
    );
    assert_eq!(fs::read(record.image.as_deref().unwrap())?, b"second");
    Ok(())
}

#[test]
fn delete_drops_directory_and_entry() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let photo = dir.child("shot.jpg");
    fs::write(&photo, b"bytes")?;

    let mut library = Library::open(dir.child("library"))?;
    let pipeline = Pipeline::new(StageMode::Copy);
    let id = library
        .create(
            MealInput {
                name: "Stew".to_owned(),
                image: Some(photo),
                ..MealInput::default()
            },
            &pipeline,
        )?
        .id
        .clone();
    let record_dir = dir.child("library").join(&id);
    assert!(record_dir.exists());

    library.delete(&id)?;
    assert!(!record_dir.exists());
    assert!(library.get(&id).is_none());
    assert!(library.delete(&id).is_err());
    Ok(())
}

#[test]
fn search_is_case_insensitive_over_name_note_and_id() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let mut library = Library::open(dir.child("library"))?;
    let pipeline = Pipeline::new(StageMode::Copy);
    library.create(
        MealInput {
            name: "Chili con Carne".to_owned(),
            note: "VERY spicy".to_owned(),
            ..MealInput::default()
        },
        &pipeline,
    )?;
    library.create(input("Pancakes"), &pipeline)?;

    assert_eq!(library.search("chili").len(), 1);
    assert_eq!(library.search("spICY").len(), 1);
    assert_eq!(library.search("zucchini").len(), 0);
    let id_prefix = &library.records()[1].id[..8];
    assert!(!library.search(id_prefix).is_empty());
    Ok(())
}

#[test]
fn sorted_views_do_not_mutate_the_catalog() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let mut library = Library::open(dir.child("library"))?;
    let pipeline = Pipeline::new(StageMode::Copy);
    library.create(input("Zucchini bake"), &pipeline)?;
    library.create(input("Apple pie"), &pipeline)?;

    let alpha: Vec<_> = library
        .sorted(SortCriterion::Alphabetical)
        .iter()
        .map(|r| r.name.clone())
        .collect();
    assert_eq!(alpha, vec!["Apple pie", "Zucchini bake"]);

    // Creation order is untouched.
    assert_eq!(library.records()[0].name, "Zucchini bake");
    Ok(())
}

#[test]
fn resolve_into_slot_copies_name_and_existing_media() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let photo = dir.child("shot.jpg");
    fs::write(&photo, b"bytes")?;

    let mut library = Library::open(dir.child("library"))?;
    let pipeline = Pipeline::new(StageMode::Copy);
    let record = library
        .create(
            MealInput {
                name: "Risotto".to_owned(),
                image: Some(photo),
                ..MealInput::default()
            },
            &pipeline,
        )?
        .clone();

    let grid = Grid::new(vec![Category::new("Lunch", RowCount::Rows(1))]);
    let mut store = SlotStore::from_grid(&grid);
    library.resolve_into_slot(&record.id, &mut store, SlotId(3))?;

    let slot = store.get(SlotId(3)).unwrap();
    assert_eq!(slot.name, "Risotto");
    assert_eq!(
        slot.photo,
        MediaSource::Present(record.image.clone().unwrap())
    );
    // No document file exists, so the recipe reference stays unset.
    assert_eq!(slot.recipe, MediaSource::Unset);
    assert!(library.get(&record.id).unwrap().last_used.is_some());

    // Sorting by last-used now surfaces the resolved record first.
    library.create(input("Other"), &pipeline)?;
    let ordered = library.sorted(SortCriterion::LastUsed);
    assert_eq!(ordered[0].name, "Risotto");
    Ok(())
}
