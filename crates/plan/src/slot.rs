use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mealgrid_shared::{Error, MediaSource, Result};

use crate::grid::{Grid, SlotId};

/// Mutable per-slot state. Setters never touch the filesystem; staged paths
/// are recorded here after the pipeline has done its work so the emitter can
/// reference the real extension on a re-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default)]
    pub empty: bool,
    #[serde(default)]
    pub photo: MediaSource,
    #[serde(default)]
    pub recipe: MediaSource,
    #[serde(default)]
    pub staged_photo: Option<PathBuf>,
    #[serde(default)]
    pub staged_recipe: Option<PathBuf>,
}

impl Slot {
    fn with_default_name(id: SlotId) -> Self {
        Self {
            name: format!("Dish {id}"),
            empty: false,
            photo: MediaSource::Unset,
            recipe: MediaSource::Unset,
            staged_photo: None,
            staged_recipe: None,
        }
    }
}

/// All slots of a finalized grid, keyed by slot id.
///
/// Created in one go when the grid is finalized; re-finalizing (changed
/// category counts) replaces the store wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotStore {
    slots: BTreeMap<SlotId, Slot>,
}

impl SlotStore {
    /// One slot per grid position, each named `Dish {id}` through the
    /// grid's single numbering formula.
    pub fn from_grid(grid: &Grid) -> Self {
        let slots = grid
            .positions()
            .map(|(_, _, _, id)| (id, Slot::with_default_name(id)))
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Slot)> {
        self.slots.iter().map(|(id, slot)| (*id, slot))
    }

    fn get_mut(&mut self, id: SlotId) -> Result<&mut Slot> {
        let total = self.slots.len() as u32;
        self.slots
            .get_mut(&id)
            .ok_or(Error::SlotOutOfRange(id.0, total))
    }

    pub fn set_name(&mut self, id: SlotId, name: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_empty(&mut self, id: SlotId, empty: bool) -> Result<()> {
        self.get_mut(id)?.empty = empty;
        Ok(())
    }

    pub fn set_photo(&mut self, id: SlotId, source: MediaSource) -> Result<()> {
        self.get_mut(id)?.photo = source;
        Ok(())
    }

    pub fn set_recipe(&mut self, id: SlotId, source: MediaSource) -> Result<()> {
        self.get_mut(id)?.recipe = source;
        Ok(())
    }

    pub fn record_staged_photo(&mut self, id: SlotId, dest: PathBuf) -> Result<()> {
        self.get_mut(id)?.staged_photo = Some(dest);
        Ok(())
    }

    pub fn record_staged_recipe(&mut self, id: SlotId, dest: PathBuf) -> Result<()> {
        self.get_mut(id)?.staged_recipe = Some(dest);
        Ok(())
    }

    /// True when the whole slot renders as the empty placeholder. Only the
    /// slot's own flag decides this; a suppressed photo or recipe hides that
    /// one element but never empties the slot. Ids outside the grid (a
    /// disabled category) count as empty.
    pub fn is_effectively_empty(&self, id: SlotId) -> bool {
        self.slots.get(&id).map_or(true, |slot| slot.empty)
    }
}

/// Grid plus slot store, persisted in the site directory so consecutive CLI
/// invocations operate on the same plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanState {
    pub grid: Grid,
    pub slots: SlotStore,
}

pub const STATE_FILE: &str = "plan.json";

impl PlanState {
    pub fn new(grid: Grid) -> Self {
        let slots = SlotStore::from_grid(&grid);
        Self { grid, slots }
    }

    pub fn load(site_root: &Path) -> Result<Self> {
        let path = site_root.join(STATE_FILE);
        let data = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Whole-file rewrite. A failure here is reported by the caller but is
    /// never fatal; the in-memory state stays authoritative for the session.
    pub fn save(&self, site_root: &Path) -> Result<()> {
        let path = site_root.join(STATE_FILE);
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data).map_err(|e| Error::io(&path, e))
    }
}
