//! `gradle.properties` as an ordered list of lines
//!
//! Comments, blank lines and lines that are not `key=value` pairs are kept
//! as-is so a file written back unchanged is byte-identical.

use super::{write_atomic, FormatAdapter};
use crate::errors::AdapterError;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertiesItem {
    Property { key: String, value: String },
    /// Text after the leading `#`
    Comment(String),
    Blank,
    /// A line that is neither; written back verbatim
    Other(String),
}

impl PropertiesItem {
    pub fn property(key: impl Into<String>, value: impl Into<String>) -> Self {
        PropertiesItem::Property {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub fn parse_properties(contents: &str) -> Vec<PropertiesItem> {
    contents
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                PropertiesItem::Blank
            } else if let Some(comment) = trimmed.strip_prefix('#') {
                PropertiesItem::Comment(comment.to_string())
            } else if let Some((key, value)) = trimmed.split_once('=') {
                PropertiesItem::property(key.trim(), value.trim())
            } else {
                PropertiesItem::Other(line.to_string())
            }
        })
        .collect()
}

pub fn properties_to_string(items: &[PropertiesItem]) -> String {
    items
        .iter()
        .map(|item| match item {
            PropertiesItem::Property { key, value } => format!("{key}={value}"),
            PropertiesItem::Comment(comment) => format!("#{comment}"),
            PropertiesItem::Blank => String::new(),
            PropertiesItem::Other(line) => line.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn get_property<'a>(items: &'a [PropertiesItem], key: &str) -> Option<&'a str> {
    items.iter().find_map(|item| match item {
        PropertiesItem::Property { key: k, value } if k == key => Some(value.as_str()),
        _ => None,
    })
}

/// Update the first occurrence in place, or append before the trailing blank line
pub fn set_property(items: &mut Vec<PropertiesItem>, key: &str, value: &str) {
    for item in items.iter_mut() {
        if let PropertiesItem::Property { key: k, value: v } = item {
            if k == key {
                value.clone_into(v);
                return;
            }
        }
    }

    let at = if matches!(items.last(), Some(PropertiesItem::Blank)) {
        items.len() - 1
    } else {
        items.len()
    };
    items.insert(at, PropertiesItem::property(key, value));
}

pub fn remove_property(items: &mut Vec<PropertiesItem>, key: &str) -> bool {
    let before = items.len();
    items.retain(|item| !matches!(item, PropertiesItem::Property { key: k, .. } if k == key));
    items.len() != before
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesAdapter;

impl FormatAdapter for PropertiesAdapter {
    type Document = Vec<PropertiesItem>;

    fn read(&self, path: &Path) -> Result<Self::Document, AdapterError> {
        Ok(parse_properties(&fs::read_to_string(path)?))
    }

    fn write(&self, path: &Path, document: &Self::Document) -> Result<(), AdapterError> {
        write_atomic(path, properties_to_string(document).as_bytes())
    }

    fn empty(&self) -> Option<Self::Document> {
        Some(vec![PropertiesItem::Blank])
    }
}
