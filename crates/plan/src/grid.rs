use std::fmt;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use mealgrid_shared::{Error, Result};

/// Week days in rendering order. Day index 0 is Monday.
pub const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Token that disables a category entirely.
pub const DISABLE_SENTINEL: &str = "/";

/// Stable identifier of a grid position, 1-based and column-wise: all of
/// Monday's rows come first, then Tuesday's, and so on. Every consumer
/// (store initialization, staging destinations, markup emission) derives
/// it through [`Grid::slot_id`] and nowhere else.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Number of rows a category occupies per day, or the category switched
/// off altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCount {
    Disabled,
    Rows(u32),
}

impl RowCount {
    /// Parses a user-entered row-count token: a non-negative integer or the
    /// disable sentinel `/`. Anything else is `InvalidRowCount`; callers
    /// fall back to the default category set rather than crash.
    pub fn parse(token: &str) -> Result<Self> {
        let trimmed = token.trim();
        if trimmed == DISABLE_SENTINEL {
            return Ok(RowCount::Disabled);
        }
        trimmed
            .parse::<u32>()
            .map(RowCount::Rows)
            .map_err(|_| Error::InvalidRowCount(token.to_owned()))
    }

    pub fn rows(&self) -> u32 {
        match self {
            RowCount::Disabled => 0,
            RowCount::Rows(n) => *n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub rows: RowCount,
}

impl Category {
    pub fn new(name: impl Into<String>, rows: RowCount) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// The finalized week grid: an ordered category list over 7 fixed days.
///
/// `rows_per_day` is constant for the grid's lifetime; changing category
/// counts means building a new grid, and slot ids from the old one are not
/// preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    categories: Vec<Category>,
}

impl Grid {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// The category set the original planner ships with.
    pub fn default_categories() -> Vec<Category> {
        vec![
            Category::new("Breakfast", RowCount::Rows(1)),
            Category::new("Lunch/Dinner", RowCount::Rows(1)),
            Category::new("Snacks", RowCount::Rows(1)),
            Category::new("Dessert", RowCount::Disabled),
        ]
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn rows_per_day(&self) -> u32 {
        self.categories.iter().map(|c| c.rows.rows()).sum()
    }

    pub fn total_slots(&self) -> u32 {
        DAYS.len() as u32 * self.rows_per_day()
    }

    /// THE numbering formula. Day-major, then category order, then row:
    /// `day * rows_per_day + offset(category) + row + 1`.
    pub fn slot_id(&self, day: usize, category: usize, row: u32) -> SlotId {
        debug_assert!(day < DAYS.len());
        debug_assert!(row < self.categories[category].rows.rows());
        let offset: u32 = self.categories[..category]
            .iter()
            .map(|c| c.rows.rows())
            .sum();
        SlotId(day as u32 * self.rows_per_day() + offset + row + 1)
    }

    /// Iterates every `(day, category, row, id)` in slot-id order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize, u32, SlotId)> + '_ {
        (0..DAYS.len()).flat_map(move |day| {
            self.categories.iter().enumerate().flat_map(move |(ci, c)| {
                (0..c.rows.rows()).map(move |row| (day, ci, row, self.slot_id(day, ci, row)))
            })
        })
    }
}

/// Current week's Monday and Sunday formatted `DD.MM.YY`, the default
/// header range when none is configured.
pub fn current_week_range() -> (String, String) {
    let today = OffsetDateTime::now_utc().date();
    let monday = today - Duration::days(today.weekday().number_days_from_monday() as i64);
    let sunday = monday + Duration::days(6);
    let format = format_description!("[day].[month].[year repr:last_two]");
    (
        monday.format(&format).unwrap_or_default(),
        sunday.format(&format).unwrap_or_default(),
    )
}
