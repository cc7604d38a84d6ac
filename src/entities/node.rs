// 🪪 Node - identity triple shared by every feed entity

use crate::error::Result;
use crate::parser::FeedElement;
use crate::resolver::ExternalId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Builder,
    Subdivision,
    Plan,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Builder => "builders",
            EntityKind::Subdivision => "subdivs",
            EntityKind::Plan => "plans",
        }
    }
}

/// Identity triple sourced from the feed
///
/// The feed id is NOT stable across regenerations of the feed; cross-snapshot
/// matching never relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub number: String,
    pub name: String,
}

impl Node {
    /// Read the identity triple: id from an attribute, number + name from child tags
    pub fn from_feed(
        el: &FeedElement<'_, '_>,
        id_attr: &'static str,
        number_tag: &'static str,
        name_tag: &'static str,
    ) -> Result<Self> {
        Ok(Node {
            id: el.required_attr(id_attr)?,
            number: el.required_text(number_tag)?,
            name: el.required_text(name_tag)?,
        })
    }
}

/// Common view over Builder / Subdivision / Plan
pub trait Entity {
    fn kind(&self) -> EntityKind;

    fn node(&self) -> &Node;

    /// Catalogue id, `None` when the slug could not be resolved
    fn external_id(&self) -> Option<ExternalId>;

    fn name(&self) -> &str {
        &self.node().name
    }
}

/// Corporation record. Only lives for one ingestion pass; builders copy its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub node: Node,
}

impl Company {
    pub fn from_feed(el: &FeedElement<'_, '_>) -> Result<Self> {
        Ok(Company {
            node: Node::from_feed(el, "CorporationID", "CorporateBuilderNumber", "CorporateName")?,
        })
    }
}
