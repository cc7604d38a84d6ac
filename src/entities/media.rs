// 🖼️ Media + grouped counts - images and typed tallies attached to entities

use crate::error::{FeedError, Result};
use crate::parser::FeedElement;
use serde::{Deserialize, Serialize};

// ============================================================================
// IMAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Subdivision,
    Elevation,
    FloorPlan,
    Interior,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Subdivision => "subdiv",
            ImageKind::Elevation => "elevation",
            ImageKind::FloorPlan => "floorplan",
            ImageKind::Interior => "interior",
        }
    }
}

/// One image of an entity
///
/// A category with no qualifying image holds a single placeholder record
/// whose fields are all blank. Check `is_placeholder()` before using one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub kind: ImageKind,
    pub src: String,
    /// `{owner slug}-{position}`, position counted over ALL source images
    pub slug: String,
    pub title: String,
    pub caption: String,
}

impl ImageRecord {
    pub fn placeholder(kind: ImageKind) -> Self {
        ImageRecord {
            kind,
            src: String::new(),
            slug: String::new(),
            title: String::new(),
            caption: String::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.src.is_empty()
            && self.slug.is_empty()
            && self.title.is_empty()
            && self.caption.is_empty()
    }
}

/// Keep images that carry a title or caption
///
/// Numbering follows the source position, qualifying or not, so an image keeps
/// its slug when a sibling gains or loses its caption.
pub fn format_images<'a, 'input: 'a>(
    kind: ImageKind,
    owner_slug: &str,
    elements: impl Iterator<Item = FeedElement<'a, 'input>>,
) -> Vec<ImageRecord> {
    let images: Vec<ImageRecord> = elements
        .enumerate()
        .filter_map(|(index, el)| {
            let title = el.attr("Title");
            let caption = el.attr("Caption");
            if title.is_empty() && caption.is_empty() {
                return None;
            }
            Some(ImageRecord {
                kind,
                src: el.text(),
                slug: format!("{}-{}", owner_slug, index + 1),
                title,
                caption,
            })
        })
        .collect();

    if images.is_empty() {
        vec![ImageRecord::placeholder(kind)]
    } else {
        images
    }
}

// ============================================================================
// GROUPED COUNTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub kind: String,
    pub count: u32,
}

/// Tally of repeated elements keyed by their `Type` attribute
///
/// Groups keep first-appearance order. A missing `Type` groups under `""`,
/// a blank element body counts as one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCounts {
    pub groups: Vec<TypeCount>,
}

impl GroupedCounts {
    pub fn from_elements<'a, 'input: 'a>(
        tag: &'static str,
        elements: impl Iterator<Item = FeedElement<'a, 'input>>,
    ) -> Result<Self> {
        let mut counts = GroupedCounts::default();
        for el in elements {
            let raw = el.text();
            let value = if raw.is_empty() {
                1
            } else {
                raw.parse::<u32>()
                    .map_err(|_| FeedError::invalid(el.entity(), tag, raw.clone()))?
            };
            if counts.add(&el.attr("Type"), value).is_none() {
                return Err(FeedError::invalid(el.entity(), tag, raw));
            }
        }
        Ok(counts)
    }

    /// Add to a group, returning its new count
    ///
    /// `None` when the group would overflow; the group is left unchanged.
    pub fn add(&mut self, kind: &str, value: u32) -> Option<u32> {
        match self.groups.iter_mut().find(|g| g.kind == kind) {
            Some(group) => {
                group.count = group.count.checked_add(value)?;
                Some(group.count)
            }
            None => {
                self.groups.push(TypeCount {
                    kind: kind.to_string(),
                    count: value,
                });
                Some(value)
            }
        }
    }

    pub fn get(&self, kind: &str) -> Option<u32> {
        self.groups.iter().find(|g| g.kind == kind).map(|g| g.count)
    }

    pub fn total(&self) -> u64 {
        self.groups.iter().map(|g| u64::from(g.count)).sum()
    }
}

// ============================================================================
// TESTS
// ============================================================================
