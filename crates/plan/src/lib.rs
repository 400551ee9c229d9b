pub mod grid;
pub mod site;
pub mod slot;

pub use grid::{Category, Grid, RowCount, SlotId, DAYS};
pub use site::{EmptyCellMode, Settings, SiteArtifacts, SourceLinks};
pub use slot::{PlanState, Slot, SlotStore};
