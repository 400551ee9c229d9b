use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use ulid::Ulid;

use crate::media::MediaSource;
use crate::{Error, Result};

/// How a selected source file reaches its canonical destination.
///
/// `cut` is accepted as a legacy spelling of `move`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum StageMode {
    #[default]
    #[strum(serialize = "copy")]
    Copy,
    #[strum(to_string = "move", serialize = "cut")]
    Move,
}

/// Result of a staging attempt. Skips are outcomes, not errors - the caller
/// decides whether to tell the user anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The destination now holds the content. `downgraded` is set when a
    /// requested move was forced to a copy to protect a library original.
    Staged { dest: PathBuf, downgraded: bool },
    /// Source and destination are the same file; nothing was touched.
    SameFile,
    /// The source path does not exist on disk.
    MissingSource,
    /// The media reference was suppressed or never set.
    NoSource,
}

impl StageOutcome {
    pub fn is_staged(&self) -> bool {
        matches!(self, StageOutcome::Staged { .. })
    }
}

/// Copies or moves user-selected media into canonical destinations.
///
/// The pipeline knows the meal library's storage root explicitly so it can
/// refuse to move a library-owned original: such a request is downgraded to
/// a copy and flagged on the outcome.
#[derive(Debug, Clone)]
pub struct Pipeline {
    mode: StageMode,
    library_root: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(mode: StageMode) -> Self {
        Self {
            mode,
            library_root: None,
        }
    }

    pub fn with_library_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.library_root = Some(root.into());
        self
    }

    pub fn mode(&self) -> StageMode {
        self.mode
    }

    /// Stages `source` at `dest`, creating intermediate directories.
    ///
    /// A missing source or a source that already is the destination is a
    /// logged no-op. Moves fall back to copy+remove across filesystems.
    pub fn stage(&self, source: &Path, dest: &Path) -> Result<StageOutcome> {
        if !source.exists() {
            tracing::warn!(source = %source.display(), "source file missing, skipping");
            return Ok(StageOutcome::MissingSource);
        }

        if self.is_same_file(source, dest) {
            tracing::debug!(path = %dest.display(), "source equals destination, nothing to do");
            return Ok(StageOutcome::SameFile);
        }

        let mut mode = self.mode;
        let mut downgraded = false;
        if mode == StageMode::Move
            && let Some(root) = &self.library_root
            && source.starts_with(root)
        {
            tracing::warn!(
                source = %source.display(),
                "refusing to move a meal library original, copying instead"
            );
            mode = StageMode::Copy;
            downgraded = true;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        match mode {
            StageMode::Copy => {
                fs::copy(source, dest).map_err(|e| Error::io(dest, e))?;
            }
            StageMode::Move => {
                if fs::rename(source, dest).is_err() {
                    // Cross-device move: duplicate first, remove the source
                    // only once the copy succeeded.
                    fs::copy(source, dest).map_err(|e| Error::io(dest, e))?;
                    fs::remove_file(source).map_err(|e| Error::io(source, e))?;
                }
            }
        }

        tracing::info!(
            source = %source.display(),
            dest = %dest.display(),
            mode = %mode,
            downgraded,
            "staged media file"
        );
        Ok(StageOutcome::Staged {
            dest: dest.to_path_buf(),
            downgraded,
        })
    }

    /// Stages a slot's media reference. Suppressed or unset references are
    /// reported as [`StageOutcome::NoSource`] without touching the disk.
    pub fn stage_media(&self, media: &MediaSource, dest: &Path) -> Result<StageOutcome> {
        match media.path() {
            Some(source) => self.stage(source, dest),
            None => Ok(StageOutcome::NoSource),
        }
    }

    fn is_same_file(&self, source: &Path, dest: &Path) -> bool {
        if source == dest {
            return true;
        }
        if !dest.exists() {
            return false;
        }
        match (fs::canonicalize(source), fs::canonicalize(dest)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Keeps the destination base name but adopts the source's extension, so
/// `photo6.jpg` staged from `pizza.png` lands as `photo6.png`. A source
/// without an extension leaves the destination untouched.
pub fn dest_with_source_ext(dest: &Path, source: &Path) -> PathBuf {
    match source.extension() {
        Some(ext) => dest.with_extension(ext),
        None => dest.to_path_buf(),
    }
}

/// Staging area for clipboard captures under `<site>/media/temp/`.
///
/// Clipboard images are materialized here under unique names so the user can
/// re-pick before committing; [`TempArea::purge`] clears everything after a
/// successful finish so copy-mode staging leaves no orphaned duplicates.
#[derive(Debug, Clone)]
pub struct TempArea {
    dir: PathBuf,
}

impl TempArea {
    pub fn new(site_root: &Path) -> Self {
        Self {
            dir: site_root.join("media").join("temp"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decodes raw clipboard image bytes and writes them as a uniquely
    /// named PNG, returning the path to hand to the staging pipeline.
    pub fn store_image(&self, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let img = image::load_from_memory(bytes)?;
        let path = self
            .dir
            .join(format!("clip-{}.png", Ulid::new().to_string().to_lowercase()));
        img.save_with_format(&path, image::ImageFormat::Png)?;
        tracing::info!(path = %path.display(), "materialized clipboard image");
        Ok(path)
    }

    /// Best-effort cleanup of the whole temp area. Failures are logged and
    /// tolerated; a leftover temp file is cosmetic, not corrupting.
    pub fn purge(&self) {
        if !self.dir.exists() {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "could not purge temp area");
        } else {
            tracing::debug!(dir = %self.dir.display(), "purged temp area");
        }
    }
}
