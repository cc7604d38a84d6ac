// 🏢 Builder Entity - a brand under a corporation

use super::node::{Company, Entity, EntityKind, Node};
use crate::config::IngestOptions;
use crate::error::Result;
use crate::parser::FeedElement;
use crate::resolver::{node_slug, ExternalId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Builder {
    pub node: Node,
    pub slug: String,
    pub external_id: Option<ExternalId>,

    // Parent corporation, denormalized
    pub corporation_id: String,
    pub corporation_name: String,
    pub corporation_number: String,

    pub website: String,
    pub leads_email: String,
    pub logo_medium: String,
    pub logo_small: String,
    pub reporting_name: String,
    pub copy_leads_email: String,

    // Relationships (catalogue ids of children)
    pub subdivision_ids: Vec<ExternalId>,
    pub plan_ids: Vec<ExternalId>,
}

impl Builder {
    /// Build from a `<Builder>` element. Relationship lists start empty.
    pub fn from_feed(
        el: &FeedElement<'_, '_>,
        company: &Company,
        options: &IngestOptions,
    ) -> Result<Self> {
        let node = Node::from_feed(el, "BuilderID", "BuilderNumber", "BrandName")?;
        let slug = node_slug(&node.id, &node.name);
        let external_id = options.catalogue.resolve(&slug);

        Ok(Builder {
            slug,
            external_id,
            corporation_id: company.node.id.clone(),
            corporation_name: company.node.name.clone(),
            corporation_number: company.node.number.clone(),
            website: el.text_or_blank("BuilderWebsite"),
            leads_email: el.text_or_blank("DefaultLeadsEmail"),
            logo_medium: el.text_or_blank("BrandLogo_Med"),
            logo_small: el.text_or_blank("BrandLogo_Sm"),
            reporting_name: el.text_or_blank("ReportingName"),
            copy_leads_email: el.text_or_blank("CopyLeadsEmail"),
            subdivision_ids: Vec::new(),
            plan_ids: Vec::new(),
            node,
        })
    }
}

impl Entity for Builder {
    fn kind(&self) -> EntityKind {
        EntityKind::Builder
    }

    fn node(&self) -> &Node {
        &self.node
    }

    fn external_id(&self) -> Option<ExternalId> {
        self.external_id
    }
}
