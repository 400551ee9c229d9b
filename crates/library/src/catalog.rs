use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;
use ulid::Ulid;
use validator::Validate;

use mealgrid_plan::grid::SlotId;
use mealgrid_plan::slot::SlotStore;
use mealgrid_shared::staging::dest_with_source_ext;
use mealgrid_shared::{Error, MediaSource, Pipeline, Result, StageOutcome};

use crate::record::{compute_change_set, ChangeSet, MealInput, MealRecord};

pub const CATALOG_FILE: &str = "catalog.json";

/// Orderings the catalog can be viewed in; never mutates the stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SortCriterion {
    #[default]
    CreationOrder,
    Alphabetical,
    LastUsed,
}

/// The persisted meal library: one catalog file plus one directory per
/// record, both under `root`.
///
/// Every mutation rewrites the catalog as a whole. A failed write is logged
/// and tolerated; the in-memory list stays authoritative for the session.
#[derive(Debug)]
pub struct Library {
    root: PathBuf,
    records: Vec<MealRecord>,
}

impl Library {
    /// Opens (or initializes) the library at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        let catalog = root.join(CATALOG_FILE);
        let records = if catalog.exists() {
            let data = fs::read_to_string(&catalog).map_err(|e| Error::io(&catalog, e))?;
            serde_json::from_str(&data)?
        } else {
            Vec::new()
        };
        Ok(Self { root, records })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn records(&self) -> &[MealRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&MealRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::RecordNotFound(id.to_owned()))
    }

    /// Creates a record: fresh id, private directory, supplied media staged
    /// under canonical names, catalog appended and persisted.
    pub fn create(&mut self, input: MealInput, pipeline: &Pipeline) -> Result<MealRecord> {
        input
            .validate()
            .map_err(|e| Error::Validation(e.to_string()))?;

        let id = Ulid::new().to_string().to_lowercase();
        let dir = self.root.join(&id);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let mut record = MealRecord {
            id,
            name: input.name,
            note: input.note,
            image: None,
            document: None,
            created_at: OffsetDateTime::now_utc().unix_timestamp(),
            last_used: None,
        };
        if let Some(src) = input.image {
            record.image = stage_canonical(pipeline, &src, &dir, "image")?;
        }
        if let Some(src) = input.document {
            record.document = stage_canonical(pipeline, &src, &dir, "recipe")?;
        }

        tracing::info!(id = %record.id, name = %record.name, "created meal record");
        self.records.push(record.clone());
        self.persist();
        Ok(record)
    }

    /// Diff-aware update: only fields that actually changed are applied, and
    /// a media field is re-staged only when the supplied source differs from
    /// the stored canonical path. Returns the applied change set.
    pub fn update(&mut self, id: &str, input: MealInput, pipeline: &Pipeline) -> Result<ChangeSet> {
        input
            .validate()
            .map_err(|e| Error::Validation(e.to_string()))?;
        let idx = self.position(id)?;

        let changes = compute_change_set(&self.records[idx], &input);
        if changes.is_empty() {
            tracing::debug!(id, "update requested but nothing changed");
            return Ok(changes);
        }

        let dir = self.root.join(id);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        if let Some(name) = &changes.name {
            self.records[idx].name = name.clone();
        }
        if let Some(note) = &changes.note {
            self.records[idx].note = note.clone();
        }
        if let Some(src) = &changes.image
            && let Some(dest) = stage_canonical(pipeline, src, &dir, "image")?
        {
            self.records[idx].image = Some(dest);
        }
        if let Some(src) = &changes.document
            && let Some(dest) = stage_canonical(pipeline, src, &dir, "recipe")?
        {
            self.records[idx].document = Some(dest);
        }

        tracing::info!(id, "updated meal record");
        self.persist();
        Ok(changes)
    }

    /// Removes the record's directory tree and its catalog entry. Directory
    /// removal is best effort: a failure is logged, the entry goes anyway.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let idx = self.position(id)?;
        let dir = self.root.join(id);
        if dir.exists()
            && let Err(e) = fs::remove_dir_all(&dir)
        {
            tracing::warn!(dir = %dir.display(), error = %e, "could not remove record directory");
        }
        self.records.remove(idx);
        tracing::info!(id, "deleted meal record");
        self.persist();
        Ok(())
    }

    /// Case-insensitive substring match over name, note and id.
    pub fn search(&self, term: &str) -> Vec<&MealRecord> {
        let needle = term.to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.note.to_lowercase().contains(&needle)
                    || r.id.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// A view of the catalog in the requested order; the stored order
    /// (creation order) is untouched.
    pub fn sorted(&self, criterion: SortCriterion) -> Vec<&MealRecord> {
        let mut view: Vec<&MealRecord> = self.records.iter().collect();
        match criterion {
            SortCriterion::CreationOrder => {}
            SortCriterion::Alphabetical => {
                view.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            }
            SortCriterion::LastUsed => {
                // Most recently used first; never-used records keep their
                // relative creation order at the end.
                view.sort_by(|a, b| b.last_used.cmp(&a.last_used));
            }
        }
        view
    }

    /// Pre-fills a slot from a record: the record's name becomes the display
    /// name, and existing canonical files become the slot's media sources.
    ///
    /// The slot snapshots plain paths; it is the staging pipeline's
    /// library-root protection that keeps these originals copy-only later.
    pub fn resolve_into_slot(
        &mut self,
        id: &str,
        store: &mut SlotStore,
        slot: SlotId,
    ) -> Result<()> {
        let idx = self.position(id)?;
        let record = self.records[idx].clone();

        store.set_name(slot, record.name)?;
        if let Some(image) = record.image.filter(|p| p.exists()) {
            store.set_photo(slot, MediaSource::Present(image))?;
        }
        if let Some(document) = record.document.filter(|p| p.exists()) {
            store.set_recipe(slot, MediaSource::Present(document))?;
        }

        self.records[idx].last_used = Some(OffsetDateTime::now_utc().unix_timestamp());
        self.persist();
        tracing::info!(id, slot = %slot, "resolved meal record into slot");
        Ok(())
    }

    /// Whole-catalog rewrite after every mutation. Non-fatal on failure.
    fn persist(&self) {
        let path = self.root.join(CATALOG_FILE);
        let result = serde_json::to_string_pretty(&self.records)
            .map_err(Error::from)
            .and_then(|data| fs::write(&path, data).map_err(|e| Error::io(&path, e)));
        if let Err(e) = result {
            tracing::warn!(error = %e, "catalog write failed, keeping in-memory state");
        }
    }
}

/// Stages a picked source to `<record dir>/<base>.<source ext>` and returns
/// the canonical path, or `None` when the source was missing (the record
/// field is then left as it was).
fn stage_canonical(
    pipeline: &Pipeline,
    source: &Path,
    dir: &Path,
    base: &str,
) -> Result<Option<PathBuf>> {
    let dest = dest_with_source_ext(&dir.join(base), source);
    match pipeline.stage(source, &dest)? {
        StageOutcome::Staged { dest, .. } => Ok(Some(dest)),
        StageOutcome::SameFile => Ok(Some(dest)),
        StageOutcome::MissingSource | StageOutcome::NoSource => Ok(None),
    }
}
