use serde::{Deserialize, Serialize};

/// One chapter of a story and the ordered images it contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Display name derived from the 1-based chapter index
    pub name: String,

    /// Absolute image URLs in reading order
    pub images: Vec<String>,
}

impl ChapterRecord {
    /// Builds the record for chapter `index`
    ///
    /// Returns None when `images` is empty: an empty probe never becomes a
    /// chapter.
    pub fn numbered(index: u32, images: Vec<String>) -> Option<Self> {
        if images.is_empty() {
            return None;
        }

        Some(Self {
            name: Self::name_for(index),
            images,
        })
    }

    /// The display name used for chapter `index`
    pub fn name_for(index: u32) -> String {
        format!("Chapter {}", index)
    }
}
