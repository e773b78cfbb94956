//! Remote tree traversal over the share listing endpoint.

use regex::Regex;

use crate::api::{FileRecord, ShareClient};
use crate::error::{Error, Result};

/// Upper bound on directories visited in one walk. The share tree is
/// acyclic by construction, so hitting this means the listing endpoint is
/// misbehaving.
const MAX_DIRECTORIES: usize = 10_000;

/// Walks the whole remote tree and returns the flattened file list.
///
/// The traversal is depth-first over an explicit stack of pending
/// directory paths, so arbitrarily deep trees cannot exhaust the call
/// stack. Directory entries are descended into and never appear in the
/// result. When `filter` is set, a file is kept only if the regex matches
/// its entire name (see [`crate::link::pattern_to_regex`]). The result is
/// sorted by `file_path` ascending.
///
/// # Errors
///
/// Propagates [`Error::Listing`] from any directory listing; a broken
/// listing makes the whole tree untrustworthy, so the walk aborts.
pub async fn walk(client: &ShareClient, filter: Option<&Regex>) -> Result<Vec<FileRecord>> {
    let mut pending = vec!["/".to_string()];
    let mut files = Vec::new();
    let mut visited = 0usize;

    while let Some(dir) = pending.pop() {
        visited += 1;
        if visited > MAX_DIRECTORIES {
            return Err(Error::Listing {
                path: dir,
                reason: format!("more than {MAX_DIRECTORIES} directories, aborting walk"),
            });
        }

        log::debug!("listing {dir}");
        for entry in client.list_directory(&dir).await? {
            if entry.is_dir {
                if entry.folder_path.is_empty() {
                    log::warn!("directory entry under {dir} has no folder_path, skipping");
                } else {
                    pending.push(entry.folder_path);
                }
            } else if filter.is_none_or(|re| re.is_match(&entry.file_name)) {
                files.push(FileRecord::from(entry));
            }
        }
    }

    files.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    Ok(files)
}
