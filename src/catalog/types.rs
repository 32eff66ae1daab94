//! Core types for the catalog

use std::fmt;

/// Kind of a library section (or of a directory inside one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Show,
    Movie,
    /// Music, photos and anything else the retention rules don't cover
    Other,
}

impl SectionKind {
    /// Parse the `type` attribute reported by the service
    pub fn from_type(value: &str) -> Self {
        match value {
            "show" => Self::Show,
            "movie" => Self::Movie,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Show => write!(f, "show"),
            SectionKind::Movie => write!(f, "movie"),
            SectionKind::Other => write!(f, "other"),
        }
    }
}

/// A library section, or a series directory inside a show section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySection {
    /// Service key used to address the section (or series) in follow-up requests
    pub id: String,
    pub kind: SectionKind,
    pub title: String,
    /// Storage roots as reported by the service, relative to the base directory
    pub storage_locations: Vec<String>,
}

/// One part of a playable item: the media file plus its side files
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaPart {
    pub primary_file: String,
    /// External streams such as subtitle tracks
    pub side_files: Vec<String>,
}

/// A playable catalog entry (movie or episode)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Service key of the item, also the path of its detail resource
    pub id: String,
    pub title: String,
    /// Parent series title, only set for episodes
    pub series_title: Option<String>,
    /// Watch count of the identity that issued the request
    pub owner_watch_count: Option<u32>,
    pub media_parts: Vec<MediaPart>,
}

impl CatalogItem {
    /// Key under which subscribers register interest in this item
    pub fn subscription_key(&self) -> &str {
        self.series_title.as_deref().unwrap_or(&self.title)
    }

    /// Resolved watch count, treating an absent count as unwatched
    pub fn watch_count(&self) -> u32 {
        self.owner_watch_count.unwrap_or(0)
    }
}

/// Listing of a section: directories (series) and/or playable items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionContents {
    pub directories: Vec<LibrarySection>,
    pub items: Vec<CatalogItem>,
}

/// Everything read from the service at the start of a cycle
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub sections: Vec<LibrarySection>,
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    /// Storage locations of every section, in listing order
    pub fn storage_locations(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|section| section.storage_locations.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, series: Option<&str>) -> CatalogItem {
        CatalogItem {
            id: "/library/metadata/1".to_string(),
            title: title.to_string(),
            series_title: series.map(str::to_string),
            owner_watch_count: None,
            media_parts: Vec::new(),
        }
    }

    #[test]
    fn test_subscription_key_prefers_series_title() {
        assert_eq!(item("Pilot", Some("Foo")).subscription_key(), "Foo");
        assert_eq!(item("Bar", None).subscription_key(), "Bar");
    }

    #[test]
    fn test_missing_watch_count_is_zero() {
        assert_eq!(item("Bar", None).watch_count(), 0);
    }

    #[test]
    fn test_section_kind_from_type() {
        assert_eq!(SectionKind::from_type("show"), SectionKind::Show);
        assert_eq!(SectionKind::from_type("movie"), SectionKind::Movie);
        assert_eq!(SectionKind::from_type("artist"), SectionKind::Other);
    }
}
