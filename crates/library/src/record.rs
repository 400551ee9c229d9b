use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A reusable dish in the meal library. Owns the directory named by its id;
/// `image`/`document` point at the canonical files inside it
/// (`image.<ext>`, `recipe.<ext>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub document: Option<PathBuf>,
    pub created_at: i64,
    #[serde(default)]
    pub last_used: Option<i64>,
}

/// Caller-supplied fields for creating or updating a record. The media
/// fields are *sources* the user picked, not canonical paths.
#[derive(Debug, Clone, Default, Validate)]
pub struct MealInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub note: String,
    pub image: Option<PathBuf>,
    pub document: Option<PathBuf>,
}

/// Which fields of an update actually changed. Media fields carry the
/// source to re-stage; `None` means the supplied source equals what is
/// already stored, so no file operation happens at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub name: Option<String>,
    pub note: Option<String>,
    pub image: Option<PathBuf>,
    pub document: Option<PathBuf>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.note.is_none()
            && self.image.is_none()
            && self.document.is_none()
    }
}

/// Pure diff between a stored record and an update request, independently
/// testable from the staging side effects it later drives.
pub fn compute_change_set(old: &MealRecord, new: &MealInput) -> ChangeSet {
    ChangeSet {
        name: (new.name != old.name).then(|| new.name.clone()),
        note: (new.note != old.note).then(|| new.note.clone()),
        image: new
            .image
            .clone()
            .filter(|src| old.image.as_ref() != Some(src)),
        document: new
            .document
            .clone()
            .filter(|src| old.document.as_ref() != Some(src)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MealRecord {
        MealRecord {
            id: "01hx".to_owned(),
            name: "Lasagna".to_owned(),
            note: "family favourite".to_owned(),
            image: Some(PathBuf::from("/lib/01hx/image.jpg")),
            document: None,
            created_at: 1_700_000_000,
            last_used: None,
        }
    }

    #[test]
    fn same_as_stored_media_produces_no_changes() {
        let input = MealInput {
            name: "Lasagna".to_owned(),
            note: "family favourite".to_owned(),
            image: Some(PathBuf::from("/lib/01hx/image.jpg")),
            document: None,
        };
        assert!(compute_change_set(&record(), &input).is_empty());
    }

    #[test]
    fn differing_fields_are_flagged_individually() {
        let input = MealInput {
            name: "Lasagna".to_owned(),
            note: "new note".to_owned(),
            image: Some(PathBuf::from("/downloads/better-shot.png")),
            document: Some(PathBuf::from("/downloads/lasagna.pdf")),
        };
        let changes = compute_change_set(&record(), &input);
        assert_eq!(changes.name, None);
        assert_eq!(changes.note.as_deref(), Some("new note"));
        assert_eq!(
            changes.image,
            Some(PathBuf::from("/downloads/better-shot.png"))
        );
        assert_eq!(changes.document, Some(PathBuf::from("/downloads/lasagna.pdf")));
    }

    #[test]
    fn absent_media_input_never_restages() {
        let input = MealInput {
            name: "Lasagna".to_owned(),
            note: "family favourite".to_owned(),
            image: None,
            document: None,
        };
        assert!(compute_change_set(&record(), &input).is_empty());
    }

    #[test]
    fn input_validation_bounds() {
        use validator::Validate;
        let mut input = MealInput {
            name: String::new(),
            ..MealInput::default()
        };
        assert!(input.validate().is_err());
        input.name = "Soup".to_owned();
        assert!(input.validate().is_ok());
    }
}
