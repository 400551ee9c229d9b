//! Collaborator interfaces: the thin I/O wrappers around the core (file
//! picking, clipboard capture, opening folders, archive packaging). They
//! have no state machine of their own; the CLI supplies simple
//! implementations and a GUI could supply richer ones.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

/// Returns a single user-chosen path, or none when the user declined.
pub trait FilePicker {
    fn pick(&self, prompt: &str) -> Option<PathBuf>;
}

/// Picker backed by a CLI argument: the "dialog" already happened on the
/// command line.
pub struct ArgPicker {
    path: Option<PathBuf>,
}

impl ArgPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl FilePicker for ArgPicker {
    fn pick(&self, _prompt: &str) -> Option<PathBuf> {
        self.path.clone()
    }
}

/// What a clipboard read produced.
pub enum Clipboard {
    /// A file path string.
    Path(PathBuf),
    /// Raw image data to be materialized as a temp file.
    Image(Vec<u8>),
    /// Nothing usable.
    Empty,
}

pub trait ClipboardReader {
    fn read(&self) -> Clipboard;
}

/// Clipboard stand-in that reads the given file: image files yield their
/// raw bytes (as a real clipboard would), everything else is treated as a
/// path reference.
pub struct FileClipboard {
    source: Option<PathBuf>,
}

impl FileClipboard {
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source }
    }
}

impl ClipboardReader for FileClipboard {
    fn read(&self) -> Clipboard {
        let Some(path) = &self.source else {
            return Clipboard::Empty;
        };
        if !path.exists() {
            tracing::warn!(path = %path.display(), "clipboard source does not exist");
            return Clipboard::Empty;
        }
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() == mime_guess::mime::IMAGE {
            match fs::read(path) {
                Ok(bytes) => Clipboard::Image(bytes),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not read clipboard image");
                    Clipboard::Empty
                }
            }
        } else {
            Clipboard::Path(path.clone())
        }
    }
}

/// Opens a path with the platform's default handler.
pub trait DirectoryOpener {
    fn open(&self, target: &Path) -> Result<()>;
}

pub struct SystemOpener;

impl DirectoryOpener for SystemOpener {
    fn open(&self, target: &Path) -> Result<()> {
        let program = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        Command::new(program)
            .arg(target)
            .spawn()
            .with_context(|| format!("could not open {}", target.display()))?;
        Ok(())
    }
}

/// Packages a finished site directory at a destination path.
pub trait Archiver {
    fn pack(&self, source_dir: &Path, dest: &Path) -> Result<()>;
}

/// Exporter that mirrors the site tree into the destination directory.
/// Compression formats stay behind the trait.
pub struct CopyArchiver;

impl Archiver for CopyArchiver {
    fn pack(&self, source_dir: &Path, dest: &Path) -> Result<()> {
        copy_tree(source_dir, dest)
            .with_context(|| format!("could not export {}", source_dir.display()))?;
        tracing::info!(dest = %dest.display(), "exported site");
        Ok(())
    }
}

fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    #[test]
    fn file_clipboard_classifies_content() -> Result<()> {
        let dir = TempDir::new()?;
        let image = dir.child("shot.png");
        fs::write(&image, b"fake png")?;
        let pdf = dir.child("doc.pdf");
        fs::write(&pdf, b"fake pdf")?;

        assert!(matches!(
            FileClipboard::new(Some(image)).read(),
            Clipboard::Image(_)
        ));
        assert!(matches!(
            FileClipboard::new(Some(pdf)).read(),
            Clipboard::Path(_)
        ));
        assert!(matches!(FileClipboard::new(None).read(), Clipboard::Empty));
        assert!(matches!(
            FileClipboard::new(Some(dir.child("missing.png"))).read(),
            Clipboard::Empty
        ));
        Ok(())
    }

    #[test]
    fn copy_archiver_mirrors_the_tree() -> Result<()> {
        let dir = TempDir::new()?;
        let site = dir.child("site");
        fs::create_dir_all(site.join("media/photos"))?;
        fs::write(site.join("index.html"), b"<html>")?;
        fs::write(site.join("media/photos/photo1.jpg"), b"img")?;

        let dest = dir.child("export");
        CopyArchiver.pack(&site, &dest)?;
        assert_eq!(fs::read(dest.join("index.html"))?, b"<html>");
        assert_eq!(fs::read(dest.join("media/photos/photo1.jpg"))?, b"img");
        Ok(())
    }
}
