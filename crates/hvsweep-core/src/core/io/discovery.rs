use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Naming convention of the per-channel files: `<prefix>.<token>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLayout {
    pub extension: String,
    pub east: String,
    pub north: String,
    pub vertical: String,
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self {
            extension: "sac".to_string(),
            east: "E".to_string(),
            north: "N".to_string(),
            vertical: "Z".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentGroup {
    pub prefix: String,
    pub east: PathBuf,
    pub north: PathBuf,
    pub vertical: PathBuf,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to read input directory '{path}': {source}", path = path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "No complete {east}/{north}/{vertical} channel group found in '{path}'",
        path = path.display()
    )]
    NoCompleteGroup {
        path: PathBuf,
        east: String,
        north: String,
        vertical: String,
    },
}

#[derive(Default)]
struct PartialGroup {
    east: Option<PathBuf>,
    north: Option<PathBuf>,
    vertical: Option<PathBuf>,
}

/// Finds every complete three-channel group in `dir`, sorted by prefix.
///
/// Groups missing any of the three channels are skipped. An empty result is
/// not an error here; callers decide whether that is fatal.
pub fn find_component_groups(
    dir: &Path,
    layout: &ChannelLayout,
) -> Result<Vec<ComponentGroup>, DiscoveryError> {
    let read_err = |source| DiscoveryError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut partial: BTreeMap<String, PartialGroup> = BTreeMap::new();
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((stem, extension)) = name.rsplit_once('.') else {
            continue;
        };
        if !extension.eq_ignore_ascii_case(&layout.extension) {
            continue;
        }
        let Some((prefix, token)) = stem.rsplit_once('.') else {
            continue;
        };
        if prefix.is_empty() {
            continue;
        }

        let group = partial.entry(prefix.to_string()).or_default();
        let slot = if token.eq_ignore_ascii_case(&layout.east) {
            &mut group.east
        } else if token.eq_ignore_ascii_case(&layout.north) {
            &mut group.north
        } else if token.eq_ignore_ascii_case(&layout.vertical) {
            &mut group.vertical
        } else {
            trace!("Ignoring file with unknown channel token: {:?}", path);
            continue;
        };
        if slot.is_none() {
            *slot = Some(path);
        }
    }

    let groups: Vec<ComponentGroup> = partial
        .into_iter()
        .filter_map(|(prefix, group)| match group {
            PartialGroup {
                east: Some(east),
                north: Some(north),
                vertical: Some(vertical),
            } => Some(ComponentGroup {
                prefix,
                east,
                north,
                vertical,
            }),
            _ => {
                debug!("Skipping incomplete channel group '{}'.", prefix);
                None
            }
        })
        .collect();

    debug!(
        "Discovered {} complete channel group(s) in {:?}.",
        groups.len(),
        dir
    );
    Ok(groups)
}

/// Returns the first complete group in prefix order, or
/// [`DiscoveryError::NoCompleteGroup`].
pub fn find_first_group(
    dir: &Path,
    layout: &ChannelLayout,
) -> Result<ComponentGroup, DiscoveryError> {
    find_component_groups(dir, layout)?
        .into_iter()
        .next()
        .ok_or_else(|| no_complete_group(dir, layout))
}

pub(crate) fn no_complete_group(dir: &Path, layout: &ChannelLayout) -> DiscoveryError {
    DiscoveryError::NoCompleteGroup {
        path: dir.to_path_buf(),
        east: layout.east.clone(),
        north: layout.north.clone(),
        vertical: layout.vertical.clone(),
    }
}
