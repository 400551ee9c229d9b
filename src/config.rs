use std::env;
use std::path::{Path, PathBuf};

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use mealgrid_plan::grid::{Category, Grid, RowCount};
use mealgrid_plan::site::{EmptyCellMode, Settings, SourceLinks};
use mealgrid_shared::{Pipeline, StageMode};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub week: WeekConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Directory the website is generated into.
    pub path: PathBuf,
}

/// Header date range. Unset fields fall back to the current week.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WeekConfig {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Row-count tokens per category: a non-negative integer or `/` to disable.
#[derive(Debug, Deserialize, Clone)]
pub struct CategoriesConfig {
    #[serde(default = "default_one")]
    pub breakfast: String,
    #[serde(default = "default_one")]
    pub lunch: String,
    #[serde(default = "default_one")]
    pub snacks: String,
    #[serde(default = "default_disabled")]
    pub dessert: String,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            breakfast: default_one(),
            lunch: default_one(),
            snacks: default_one(),
            dessert: default_disabled(),
        }
    }
}

fn default_one() -> String {
    "1".to_owned()
}

fn default_disabled() -> String {
    "/".to_owned()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// `dash` or `none`.
    #[serde(default = "default_empty_cell")]
    pub empty_cell: String,
    #[serde(default = "default_true")]
    pub show_photos: bool,
    #[serde(default = "default_true")]
    pub show_source_links: bool,
    #[serde(default = "default_full_list_label")]
    pub full_list_label: String,
    #[serde(default = "default_per_dish_label")]
    pub per_dish_label: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            empty_cell: default_empty_cell(),
            show_photos: true,
            show_source_links: true,
            full_list_label: default_full_list_label(),
            per_dish_label: default_per_dish_label(),
        }
    }
}

fn default_empty_cell() -> String {
    "dash".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_full_list_label() -> String {
    "Full ingredients list".to_owned()
}

fn default_per_dish_label() -> String {
    "Ingredients separated by dish".to_owned()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// `copy` or `move` (`cut` is accepted as a legacy spelling).
    #[serde(default = "default_operation")]
    pub operation: String,
    #[serde(default)]
    pub rename_subfolder: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            operation: default_operation(),
            rename_subfolder: false,
        }
    }
}

fn default_operation() -> String {
    "copy".to_owned()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LibraryConfig {
    /// Meal library storage root; defaults to `meal-library` next to the
    /// working directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (MEALGRID__SITE__PATH, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder.set_default("site.path", "mealplan-site")?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "mealgrid.toml".to_string());

        // Config file is optional - ignore if not found
        if Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("MEALGRID")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.site.path.as_os_str().is_empty() {
            return Err("site.path must not be empty".to_string());
        }
        if self.display.empty_cell.parse::<EmptyCellMode>().is_err() {
            return Err(format!(
                "display.empty_cell must be 'dash' or 'none', got '{}'",
                self.display.empty_cell
            ));
        }
        if self.files.operation.parse::<StageMode>().is_err() {
            return Err(format!(
                "files.operation must be 'copy' or 'move', got '{}'",
                self.files.operation
            ));
        }
        Ok(())
    }

    pub fn site_root(&self) -> &Path {
        &self.site.path
    }

    pub fn library_root(&self) -> PathBuf {
        self.library
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("meal-library"))
    }

    /// Finalizes the grid from the configured row-count tokens. An invalid
    /// token falls back to the default category set instead of failing.
    pub fn grid(&self) -> Grid {
        match self.try_grid() {
            Ok(grid) => grid,
            Err(e) => {
                tracing::warn!(error = %e, "invalid category row counts, using defaults");
                Grid::new(Grid::default_categories())
            }
        }
    }

    fn try_grid(&self) -> mealgrid_shared::Result<Grid> {
        Ok(Grid::new(vec![
            Category::new("Breakfast", RowCount::parse(&self.categories.breakfast)?),
            Category::new("Lunch/Dinner", RowCount::parse(&self.categories.lunch)?),
            Category::new("Snacks", RowCount::parse(&self.categories.snacks)?),
            Category::new("Dessert", RowCount::parse(&self.categories.dessert)?),
        ]))
    }

    pub fn settings(&self) -> Settings {
        let (default_start, default_end) = mealgrid_plan::grid::current_week_range();
        Settings {
            week_start: self.week.start.clone().unwrap_or(default_start),
            week_end: self.week.end.clone().unwrap_or(default_end),
            empty_cell: self.display.empty_cell.parse().unwrap_or_default(),
            show_photos: self.display.show_photos,
            source_links: self.display.show_source_links.then(|| SourceLinks {
                full_list_label: self.display.full_list_label.clone(),
                per_dish_label: self.display.per_dish_label.clone(),
            }),
        }
    }

    pub fn stage_mode(&self) -> StageMode {
        self.files.operation.parse().unwrap_or_default()
    }

    /// The staging pipeline, aware of the library root so moves of library
    /// originals get downgraded to copies.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.stage_mode()).with_library_root(self.library_root())
    }
}
