//! Archival: the terminal rename of a document out of the input directory.
//!
//! A single `rename` keeps the document visible in exactly one place at any
//! instant. When the destination already holds a file of the same name the
//! document is renamed to the first free `{stem}_{n}.{ext}` instead; an
//! existing archive entry is never overwritten.

use crate::config::WatchConfig;
use crate::error::MoveError;
use crate::output::Outcome;
use std::path::{Path, PathBuf};

/// Move `source` into the processed or error directory.
///
/// Returns the final archive path.
pub fn archive(source: &Path, outcome: Outcome, config: &WatchConfig) -> Result<PathBuf, MoveError> {
    let dir = match outcome {
        Outcome::Processed => &config.processed_dir,
        Outcome::Error => &config.error_dir,
    };
    move_into(source, dir)
}

/// Rename `source` into `dir`, choosing a free name on collision.
pub fn move_into(source: &Path, dir: &Path) -> Result<PathBuf, MoveError> {
    let name = source.file_name().ok_or_else(|| MoveError::NoFileName {
        path: source.to_path_buf(),
    })?;
    let dest = free_destination(&dir.join(name));

    std::fs::rename(source, &dest).map_err(|e| MoveError::Rename {
        from: source.to_path_buf(),
        to: dest.clone(),
        source: e,
    })?;
    Ok(dest)
}

/// `dest` itself if unused, otherwise `{stem}_1.{ext}`, `{stem}_2.{ext}`, …
fn free_destination(dest: &Path) -> PathBuf {
    if !dest.exists() {
        return dest.to_path_buf();
    }

    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = dest
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dest.with_file_name(format!("{stem}_{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dest.to_path_buf())
}
