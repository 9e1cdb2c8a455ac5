use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const CATEGORY_TABLE: &str = "Table";
pub const CATEGORY_IMAGE: &str = "Image";
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Broad kind of an extracted element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Table,
    Image,
}

impl ContentType {
    /// Map a partitioner category (`Table`, `Image`, `NarrativeText`, ...) to a content type.
    pub fn from_category(category: &str) -> Self {
        match category {
            CATEGORY_TABLE => Self::Table,
            CATEGORY_IMAGE => Self::Image,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Image => "image",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "table" => Some(Self::Table),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of extracted PDF content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub category: String,
    pub content: String,
    pub content_type: ContentType,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let category = category.into();
        let content_type = ContentType::from_category(&category);
        Self {
            id: id.into(),
            category,
            content: content.into(),
            content_type,
            source: source.into(),
            html_content: None,
            image_data: None,
            image_desc: None,
            page_number: None,
            metadata: Map::new(),
        }
    }

    /// Text that gets embedded and stored in the vector index.
    pub fn page_content(&self) -> String {
        match self.content_type {
            ContentType::Image => format!(
                "Image: {}",
                self.image_desc.as_deref().unwrap_or("No image description")
            ),
            ContentType::Table => match self.html_content.as_deref() {
                Some(html) if !html.is_empty() => {
                    format!("{}\nTable HTML: {}", self.content, html)
                }
                _ => self.content.clone(),
            },
            ContentType::Text => self.content.clone(),
        }
    }

    /// Image description if one was produced for this element.
    pub fn described_image(&self) -> Option<&str> {
        match self.content_type {
            ContentType::Image => self.image_desc.as_deref().filter(|d| !d.is_empty()),
            _ => None,
        }
    }
}

/// Flat metadata stored alongside every indexed chunk
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(rename = "type")]
    pub element_type: String,
    pub content_type: ContentType,
    pub source: String,
    pub id: String,
    pub image_data: String,
    pub image_desc: String,
    pub html_content: String,
}

impl ChunkMetadata {
    /// Flatten into string pairs, the only metadata shape every vector store accepts.
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("type".to_string(), self.element_type.clone()),
            ("content_type".to_string(), self.content_type.as_str().to_string()),
            ("source".to_string(), self.source.clone()),
            ("id".to_string(), self.id.clone()),
            ("image_data".to_string(), self.image_data.clone()),
            ("image_desc".to_string(), self.image_desc.clone()),
            ("html_content".to_string(), self.html_content.clone()),
        ])
    }

    /// Rebuild from a store's metadata object; missing keys fall back to defaults.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let get = |key: &str| -> String {
            map.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let element_type = get("type");
        let source = get("source");
        let id = get("id");

        Self {
            element_type: if element_type.is_empty() { UNKNOWN_CATEGORY.to_string() } else { element_type },
            content_type: ContentType::from_str(&get("content_type")).unwrap_or_default(),
            source: if source.is_empty() { UNKNOWN_CATEGORY.to_string() } else { source },
            id: if id.is_empty() { UNKNOWN_CATEGORY.to_string() } else { id },
            image_data: get("image_data"),
            image_desc: get("image_desc"),
            html_content: get("html_content"),
        }
    }
}

impl From<&Element> for ChunkMetadata {
    fn from(element: &Element) -> Self {
        Self {
            element_type: element.category.clone(),
            content_type: element.content_type,
            source: element.source.clone(),
            id: element.id.clone(),
            image_data: element.image_data.clone().unwrap_or_default(),
            image_desc: element.image_desc.clone().unwrap_or_default(),
            html_content: element.html_content.clone().unwrap_or_default(),
        }
    }
}

/// A chunk returned by similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_round_trips_through_flat_map() {
        let mut element = Element::new("abc-element_4", "Table", "x", "report.pdf");
        element.html_content = Some("<table/>".to_string());

        let metadata = ChunkMetadata::from(&element);
        let flat: Map<String, Value> = metadata
            .to_map()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();

        assert_eq!(ChunkMetadata::from_map(&flat), metadata);
    }

    #[test]
    fn test_metadata_defaults_for_missing_keys() {
        let metadata = ChunkMetadata::from_map(&Map::new());
        assert_eq!(metadata.element_type, "unknown");
        assert_eq!(metadata.source, "unknown");
        assert_eq!(metadata.content_type, ContentType::Text);
        assert!(metadata.html_content.is_empty());
    }
}
