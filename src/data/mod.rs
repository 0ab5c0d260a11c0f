//! Content records for the dua reader
//!
//! This module contains the typed views the presentation layer uses for
//! rendering. The loader itself treats remote content as opaque JSON; these
//! types are only applied at the UI boundary, so deserialization is
//! deliberately tolerant of missing or extra fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata record for a subcategory of duas
///
/// Field names follow the remote API; everything defaults so a sparse or
/// renamed payload still renders instead of failing the whole screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    /// Remote identifier, if the API provided one
    #[serde(default)]
    pub id: Option<i64>,
    /// Display name of the subcategory
    #[serde(default)]
    pub name: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
}

/// A single dua content item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dua {
    /// Remote identifier, if the API provided one
    #[serde(default)]
    pub id: Option<i64>,
    /// Title shown in the list view
    #[serde(default)]
    pub title: String,
    /// Arabic text of the dua
    #[serde(default)]
    pub arabic: Option<String>,
    /// Latin-script transliteration
    #[serde(default)]
    pub transliteration: Option<String>,
    /// Translation text
    #[serde(default)]
    pub translation: Option<String>,
    /// Source reference (book, chapter, hadith number)
    #[serde(default)]
    pub reference: Option<String>,
    /// URL of the audio recitation, if one exists
    #[serde(default)]
    pub audio: Option<String>,
}

impl Subcategory {
    /// Builds a Subcategory from an opaque metadata record
    ///
    /// Unrecognized shapes produce a default record rather than an error;
    /// the list still renders with the items alone.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

impl Dua {
    /// Builds a Dua from an opaque item record
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Stable key used for the favorites set and the playback registry
    ///
    /// Prefers the remote id; falls back to the title so locally cached
    /// content without ids still favorites consistently.
    pub fn favorite_key(&self) -> String {
        match self.id {
            Some(id) => format!("dua_{}", id),
            None => format!("dua_{}", self.title.to_lowercase().replace(' ', "_")),
        }
    }

    /// First non-empty line of translation or transliteration for list rows
    pub fn snippet(&self) -> Option<&str> {
        self.translation
            .as_deref()
            .or(self.transliteration.as_deref())
            .and_then(|text| text.lines().find(|line| !line.trim().is_empty()))
    }
}
