mod catalog;
mod record;

pub use catalog::{Library, SortCriterion, CATALOG_FILE};
pub use record::{compute_change_set, ChangeSet, MealInput, MealRecord};
