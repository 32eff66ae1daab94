//! Directory sweep
//!
//! Walks each storage location bottom-up and removes junk: entries with an
//! unwanted extension, and directories that are empty when visited. Children
//! are handled before their parent, so a directory emptied by this pass is
//! removed by the same pass, up to and including the location root.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::services::deletion::DeletionOutcome;
use crate::services::file_resolver::under_base;

/// Sweep every storage location, returning one outcome per deletion attempt.
///
/// Extensions match without regard to case: with `exe` configured,
/// `SETUP.EXE` is removed too.
pub fn sweep<'a, I>(
    locations: I,
    base_directory: &Path,
    unwanted_extensions: &BTreeSet<String>,
) -> Vec<DeletionOutcome>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut outcomes = Vec::new();

    for location in locations {
        let root = under_base(base_directory, location);
        if !root.is_dir() {
            warn!(path = %root.display(), "Storage location missing, skipping sweep");
            continue;
        }

        let before = outcomes.len();
        sweep_location(&root, unwanted_extensions, &mut outcomes);
        info!(
            path = %root.display(),
            removed = outcomes.len() - before,
            "Swept storage location"
        );
    }

    outcomes
}

fn sweep_location(
    root: &Path,
    unwanted_extensions: &BTreeSet<String>,
    outcomes: &mut Vec<DeletionOutcome>,
) {
    let walker = WalkDir::new(root)
        .contents_first(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        let unwanted = has_unwanted_extension(path, unwanted_extensions);
        if unwanted || (entry.file_type().is_dir() && is_empty_dir(path)) {
            debug!(path = %path.display(), unwanted, "Sweeping");
            outcomes.push(DeletionOutcome::attempt(path.to_path_buf()));
        }
    }
}

fn has_unwanted_extension(path: &Path, unwanted_extensions: &BTreeSet<String>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| unwanted_extensions.contains(&ext.to_lowercase()))
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
