//! Plex MediaContainer parsing
//!
//! Plex answers every library request with the same envelope:
//!
//! ```xml
//! <MediaContainer>
//!   <Directory key="1" type="show" title="TV"><Location path="/tv"/></Directory>
//!   <Video key="/library/metadata/7" title="Pilot" viewCount="1">
//!     <Media><Part file="/tv/Foo/Pilot.mkv"><Stream file="/tv/Foo/Pilot.srt"/></Part></Media>
//!   </Video>
//! </MediaContainer>
//! ```
//!
//! Only the elements and attributes the retention engine needs are read;
//! everything else is skipped.

use quick_xml::Reader;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use crate::catalog::{CatalogItem, LibrarySection, MediaPart, SectionContents, SectionKind};

/// Reasons a MediaContainer document could not be read
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("attribute `{attribute}` is not a number: {value:?}")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
    },
}

/// Parse a MediaContainer document into directories and items
pub fn parse_media_container(xml: &str) -> Result<SectionContents, ResponseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut builder = ContainerBuilder::default();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => builder.open(e)?,
            Event::Empty(ref e) => {
                // Self-closing tags like <Location path="..."/>
                builder.open(e)?;
                builder.close(e.local_name().as_ref());
            }
            Event::End(ref e) => builder.close(e.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(builder.contents)
}

/// Attributes of one element, matched by name without regard to case
struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn read(e: &BytesStart) -> Result<Self, ResponseError> {
        let mut pairs = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = attr.unescape_value()?.into_owned();
            pairs.push((key, value));
        }
        Ok(Self(pairs))
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, element: &'static str, name: &'static str) -> Result<String, ResponseError> {
        self.get(name)
            .map(str::to_string)
            .ok_or(ResponseError::MissingAttribute {
                element,
                attribute: name,
            })
    }

    fn count(&self, name: &'static str) -> Result<Option<u32>, ResponseError> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ResponseError::InvalidNumber {
                    attribute: name,
                    value: value.to_string(),
                }),
        }
    }
}

/// Accumulates elements while the reader walks the document
#[derive(Default)]
struct ContainerBuilder {
    contents: SectionContents,
    directory: Option<LibrarySection>,
    video: Option<CatalogItem>,
    in_media: bool,
    part: Option<MediaPart>,
}

impl ContainerBuilder {
    fn open(&mut self, e: &BytesStart) -> Result<(), ResponseError> {
        match e.local_name().as_ref() {
            b"Directory" if self.directory.is_none() && self.video.is_none() => {
                let attrs = Attributes::read(e)?;
                self.directory = Some(LibrarySection {
                    id: attrs.required("Directory", "key")?,
                    kind: SectionKind::from_type(attrs.get("type").unwrap_or_default()),
                    title: attrs.required("Directory", "title")?,
                    storage_locations: Vec::new(),
                });
            }
            b"Location" => {
                if let Some(directory) = self.directory.as_mut() {
                    let attrs = Attributes::read(e)?;
                    directory
                        .storage_locations
                        .push(attrs.required("Location", "path")?);
                }
            }
            b"Video" if self.video.is_none() => {
                let attrs = Attributes::read(e)?;
                self.video = Some(CatalogItem {
                    id: attrs.required("Video", "key")?,
                    title: attrs.required("Video", "title")?,
                    series_title: attrs.get("grandparentTitle").map(str::to_string),
                    owner_watch_count: attrs.count("viewCount")?,
                    media_parts: Vec::new(),
                });
            }
            b"Media" if self.video.is_some() => self.in_media = true,
            b"Part" if self.in_media => {
                let attrs = Attributes::read(e)?;
                self.part = Some(MediaPart {
                    primary_file: attrs.required("Part", "file")?,
                    side_files: Vec::new(),
                });
            }
            b"Stream" => {
                if let Some(part) = self.part.as_mut() {
                    let attrs = Attributes::read(e)?;
                    // Only external streams (subtitles) carry a file
                    if let Some(file) = attrs.get("file") {
                        part.side_files.push(file.to_string());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"Directory" => {
                if let Some(directory) = self.directory.take() {
                    self.contents.directories.push(directory);
                }
            }
            b"Video" => {
                if let Some(video) = self.video.take() {
                    self.contents.items.push(video);
                }
                self.in_media = false;
            }
            b"Media" => self.in_media = false,
            b"Part" => {
                if let (Some(part), Some(video)) = (self.part.take(), self.video.as_mut()) {
                    video.media_parts.push(part);
                }
            }
            _ => {}
        }
    }
}
