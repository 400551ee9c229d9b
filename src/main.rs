use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mealgrid::cli::plan::{FinishArgs, PasteTarget, SlotEdit};
use mealgrid::cli::{library, plan};
use mealgrid_library::SortCriterion;

/// mealgrid - weekly meal plans as a static website
#[derive(Parser)]
#[command(name = "mealgrid")]
#[command(about = "Plan a week of meals and generate a static website for it", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finalize the grid from config and create the site structure
    Init,
    /// Regenerate index.html and styles.css from the current plan state
    Render,
    /// Inspect and edit individual slots
    Slot {
        #[command(subcommand)]
        command: SlotCommands,
    },
    /// Manage the reusable meal library
    Library {
        #[command(subcommand)]
        command: LibraryCommands,
    },
    /// Stage all pending media, clean up and optionally export
    Finish {
        /// Document for the "full ingredients list" download link
        #[arg(long)]
        full_list: Option<PathBuf>,
        /// Document for the "ingredients per dish" download link
        #[arg(long)]
        per_dish: Option<PathBuf>,
        /// Export the finished site into this directory
        #[arg(long)]
        archive: Option<PathBuf>,
    },
    /// Open the generated site in the file manager or browser
    Open {
        /// Open index.html in the browser instead of the folder
        #[arg(long)]
        browser: bool,
    },
}

#[derive(Subcommand)]
enum SlotCommands {
    /// Edit a slot's name, empty flag or media references
    Set {
        /// Slot number (1-based)
        id: u32,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Mark the slot empty (renders the placeholder)
        #[arg(long, conflicts_with = "no_empty")]
        empty: bool,
        /// Clear the empty flag
        #[arg(long)]
        no_empty: bool,
        /// Photo source: a path, or '/' to hide the photo element
        #[arg(long)]
        photo: Option<String>,
        /// Recipe source: a path, or '/' to hide the recipe link
        #[arg(long)]
        recipe: Option<String>,
    },
    /// Feed clipboard content (path or image data) into a slot
    Paste {
        /// Slot number (1-based)
        id: u32,
        /// Which element the clipboard feeds
        #[arg(long, value_enum, default_value_t = PasteTarget::Photo)]
        target: PasteTarget,
        /// File standing in for the clipboard content
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// Show every slot with its current state
    List,
}

#[derive(Subcommand)]
enum LibraryCommands {
    /// Add a meal with optional photo and recipe document
    Add {
        name: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// Update a meal; media is re-staged only when the source changed
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// Delete a meal and its stored files
    Rm { id: String },
    /// List all meals
    List {
        /// creation-order, alphabetical or last-used
        #[arg(long, default_value = "creation-order")]
        sort: String,
    },
    /// Find meals by name, note or id
    Search { term: String },
    /// Fill a slot from a library meal
    Use {
        id: String,
        /// Slot number (1-based)
        slot: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = mealgrid::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    mealgrid::observability::init_observability(&config.observability.log_level)?;

    match cli.command {
        Commands::Init => plan::init(&config),
        Commands::Render => plan::render(&config),
        Commands::Slot { command } => match command {
            SlotCommands::Set {
                id,
                name,
                empty,
                no_empty,
                photo,
                recipe,
            } => {
                let empty = if empty {
                    Some(true)
                } else if no_empty {
                    Some(false)
                } else {
                    None
                };
                plan::slot_set(
                    &config,
                    id,
                    SlotEdit {
                        name,
                        empty,
                        photo,
                        recipe,
                    },
                )
            }
            SlotCommands::Paste { id, target, from } => plan::slot_paste(&config, id, target, from),
            SlotCommands::List => plan::slot_list(&config),
        },
        Commands::Library { command } => match command {
            LibraryCommands::Add {
                name,
                note,
                image,
                document,
            } => library::add(&config, name, note, image, document),
            LibraryCommands::Update {
                id,
                name,
                note,
                image,
                document,
            } => library::update(&config, id, name, note, image, document),
            LibraryCommands::Rm { id } => library::remove(&config, id),
            LibraryCommands::List { sort } => {
                let criterion = sort.parse::<SortCriterion>().map_err(|_| {
                    anyhow::anyhow!("unknown sort '{sort}', expected creation-order, alphabetical or last-used")
                })?;
                library::list(&config, criterion)
            }
            LibraryCommands::Search { term } => library::search(&config, term),
            LibraryCommands::Use { id, slot } => library::use_record(&config, id, slot),
        },
        Commands::Finish {
            full_list,
            per_dish,
            archive,
        } => plan::finish(
            &config,
            FinishArgs {
                full_list,
                per_dish,
                archive,
            },
        ),
        Commands::Open { browser } => plan::open(&config, browser),
    }
}
