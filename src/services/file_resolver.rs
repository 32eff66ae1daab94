//! Resolve the files behind a catalog item
//!
//! Listings don't carry stream data, so the item's detail is fetched again
//! with the owner's token and every referenced file is collected: side files
//! (subtitles) first, then the part's own media file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogItem, MediaPart};
use crate::services::library_content::{LibraryContentService, ServiceError};

/// Every on-disk path belonging to `item`, under `base_directory`
pub async fn resolve_files(
    service: &dyn LibraryContentService,
    item: &CatalogItem,
    owner_token: &str,
    base_directory: &Path,
) -> Result<Vec<PathBuf>, ServiceError> {
    let entries = service.get_item_detail(&item.id, owner_token).await?;

    Ok(entries
        .iter()
        .flat_map(|entry| entry.media_parts.iter())
        .flat_map(part_files)
        .map(|file| under_base(base_directory, file))
        .collect())
}

/// Side files in order, followed by the primary file
fn part_files(part: &MediaPart) -> impl Iterator<Item = &str> {
    part.side_files
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(part.primary_file.as_str()))
}

/// Prefix a server path with the base directory.
///
/// Server paths are absolute, so this concatenates rather than joins:
/// `/srv/plex` + `/tv/a.mkv` is `/srv/plex/tv/a.mkv`.
pub fn under_base(base_directory: &Path, server_path: &str) -> PathBuf {
    let mut path = OsString::from(base_directory.as_os_str());
    path.push(server_path);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::services::library_content::fake::FakeLibrary;

    fn part(primary: &str, sides: &[&str]) -> MediaPart {
        MediaPart {
            primary_file: primary.to_string(),
            side_files: sides.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn entry(parts: Vec<MediaPart>) -> CatalogItem {
        CatalogItem {
            id: "/library/metadata/7".to_string(),
            title: "Pilot".to_string(),
            series_title: None,
            owner_watch_count: Some(1),
            media_parts: parts,
        }
    }

    #[test]
    fn test_under_base_concatenates() {
        assert_eq!(
            under_base(Path::new("/srv/plex"), "/tv/a.mkv"),
            PathBuf::from("/srv/plex/tv/a.mkv")
        );
        assert_eq!(under_base(Path::new(""), "/tv/a.mkv"), PathBuf::from("/tv/a.mkv"));
    }

    #[tokio::test]
    async fn test_side_files_precede_primary() {
        let listed = entry(Vec::new());
        let detail = vec![
            entry(vec![
                part("/tv/a.mkv", &["/tv/a.en.srt", "/tv/a.de.srt"]),
                part("/tv/a-part2.mkv", &[]),
            ]),
            entry(vec![part("/tv/b.mkv", &["/tv/b.srt"])]),
        ];
        let library = FakeLibrary::default().with_detail(&listed.id, "owner", detail);

        let files = resolve_files(&library, &listed, "owner", Path::new("/srv"))
            .await
            .unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("/srv/tv/a.en.srt"),
                PathBuf::from("/srv/tv/a.de.srt"),
                PathBuf::from("/srv/tv/a.mkv"),
                PathBuf::from("/srv/tv/a-part2.mkv"),
                PathBuf::from("/srv/tv/b.srt"),
                PathBuf::from("/srv/tv/b.mkv"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_detail_resolves_nothing() {
        let listed = entry(Vec::new());
        let library = FakeLibrary::default();

        let files = resolve_files(&library, &listed, "owner", Path::new("/srv"))
            .await
            .unwrap();

        assert!(files.is_empty());
        assert_eq!(library.calls(), vec!["detail /library/metadata/7 owner".to_string()]);
    }
}
