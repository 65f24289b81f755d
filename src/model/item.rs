use crate::model::ChapterRecord;
use serde::{Deserialize, Serialize};

/// Sentinel stored in place of any textual field that could not be extracted
pub const UNKNOWN: &str = "unknown";

/// Returns the trimmed value, or the sentinel when it is missing or blank
pub fn or_unknown(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Listing fields that some sources provide before the detail page is visited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSummary {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

/// A story as found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReference {
    /// Identifier derived from the locator (or given by the source)
    pub id: String,

    /// Absolute URL of the detail resource
    pub locator: String,

    /// Pre-fetched listing fields, if any
    pub summary: Option<ItemSummary>,
}

impl ItemReference {
    /// Creates a reference whose id is derived from the locator's last path segment
    pub fn from_locator(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        let id = crate::url::derive_item_id(&locator).unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            id,
            locator,
            summary: None,
        }
    }

    /// Attaches listing fields to the reference
    pub fn with_summary(mut self, summary: ItemSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    fn summary_field(&self, pick: fn(&ItemSummary) -> Option<&String>) -> Option<&str> {
        self.summary.as_ref().and_then(pick).map(String::as_str)
    }
}

/// Raw, possibly incomplete fields read by a detail extractor
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub chapter_count: Option<u32>,
}

/// Metadata of one story with every textual field filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetail {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub thumbnail: String,

    /// Chapter count advertised by the source, when it exposes one
    pub chapter_count: Option<u32>,
}

impl ItemDetail {
    /// Merges extracted fields with the reference's listing summary
    ///
    /// Each field takes the extracted value first, then the summary value,
    /// then the `UNKNOWN` sentinel.
    pub fn from_fields(reference: &ItemReference, fields: ExtractedFields) -> Self {
        Self {
            id: merged(fields.id.as_ref(), Some(reference.id.as_str())),
            title: merged(fields.title.as_ref(), reference.summary_field(|s| s.title.as_ref())),
            author: merged(fields.author.as_ref(), reference.summary_field(|s| s.author.as_ref())),
            description: merged(
                fields.description.as_ref(),
                reference.summary_field(|s| s.description.as_ref()),
            ),
            thumbnail: merged(
                fields.thumbnail.as_ref(),
                reference.summary_field(|s| s.thumbnail.as_ref()),
            ),
            chapter_count: fields.chapter_count,
        }
    }
}

fn merged(extracted: Option<&String>, fallback: Option<&str>) -> String {
    let extracted = extracted.map(|s| s.trim()).filter(|s| !s.is_empty());
    or_unknown(extracted.or(fallback))
}

/// A fully assembled story as persisted in the collection
///
/// Field order here is the field order of the written JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub thumbnail: String,
    pub chapters: Vec<ChapterRecord>,
}

impl ItemRecord {
    /// Assembles a record from extracted metadata and collected chapters
    pub fn new(detail: ItemDetail, chapters: Vec<ChapterRecord>) -> Self {
        Self {
            id: detail.id,
            title: detail.title,
            author: detail.author,
            description: detail.description,
            thumbnail: detail.thumbnail,
            chapters,
        }
    }

    /// Total number of images across all chapters
    pub fn image_count(&self) -> usize {
        self.chapters.iter().map(|c| c.images.len()).sum()
    }
}
