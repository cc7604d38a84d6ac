// 🏠 Plan Entity - a home plan offered in one subdivision
//
// Pricing derivations:
//   actual_price = BasePrice rounded half-to-even
//   base_price   = floor(actual_price / 100_000) * 100_000

use super::media::{format_images, GroupedCounts, ImageKind, ImageRecord};
use super::node::{Entity, EntityKind, Node};
use super::subdivision::Subdivision;
use crate::config::IngestOptions;
use crate::error::{FeedError, Result};
use crate::parser::FeedElement;
use crate::resolver::{filter_name, lookup_slug, node_slug, ExternalId};
use serde::{Deserialize, Serialize};

/// Price bracket width used for `base_price`
pub const PRICE_BRACKET: i64 = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub node: Node,
    pub slug: String,
    /// `{subdivision}-{plan}` slug the catalogue is keyed by for plans
    pub lookup_slug: String,
    pub external_id: Option<ExternalId>,

    pub headline: String,
    pub description: String,
    pub available: bool,
    pub actual_price: i64,
    pub base_price: i64,
    pub base_sqft: String,

    pub website: String,
    pub nhs_website: String,
    pub virtual_tour: String,
    pub design_center_link: String,

    pub stories: String,
    /// Full + half/2, e.g. `"2.5"` or `"3"`
    pub baths: String,
    pub bedrooms: String,
    pub garage: String,
    pub dining_areas: String,
    pub has_basement: bool,
    pub living_areas: GroupedCounts,
    pub amenities: GroupedCounts,

    pub elevations: Vec<ImageRecord>,
    pub floorplans: Vec<ImageRecord>,
    pub interiors: Vec<ImageRecord>,
    pub featured_image: String,

    // Contact fields copied from the subdivision
    pub leads_phone: String,
    pub leads_email: String,
    pub hours: String,
    pub address: String,

    // Relationships
    pub builder_ids: Vec<ExternalId>,
    pub subdivision_ids: Vec<ExternalId>,
}

/// Round a feed price to whole dollars (half-to-even)
///
/// `None` for negative prices and for prices outside the `i64` range.
pub fn actual_price(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    let rounded = value.round_ties_even();
    // i64::MAX as f64 rounds up to 2^63, itself out of range
    if !rounded.is_finite() || rounded < 0.0 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

/// Floor a non-negative price to its bracket: 459_999 → 400_000
pub fn base_price(actual: i64) -> i64 {
    actual / PRICE_BRACKET * PRICE_BRACKET
}

/// `full + half / 2` without a trailing `.0`
pub fn format_baths(full: u32, half: u32) -> String {
    let halves = u64::from(full) * 2 + u64::from(half);
    if halves % 2 == 0 {
        (halves / 2).to_string()
    } else {
        format!("{}.5", halves / 2)
    }
}

impl Plan {
    pub fn from_feed(
        el: &FeedElement<'_, '_>,
        subdivision: &Subdivision,
        options: &IngestOptions,
    ) -> Result<Self> {
        let mut node = Node::from_feed(el, "PlanID", "PlanNumber", "PlanName")?;
        node.name = filter_name(&options.name_filters, &node.name);
        let slug = node_slug(&node.id, &node.name);
        let lookup_slug = lookup_slug(&subdivision.node.name, &node.name);
        let external_id = options.catalogue.resolve(&lookup_slug);

        let raw_price = el.required_text("BasePrice")?;
        let actual_price = actual_price(&raw_price)
            .ok_or_else(|| FeedError::invalid(el.entity(), "BasePrice", raw_price.clone()))?;

        // Last block wins when a plan lists several
        let image_block = el.last_child("PlanImages");
        let images = |tag: &'static str, kind: ImageKind| match image_block {
            Some(block) => format_images(kind, &slug, block.children(tag)),
            None => vec![ImageRecord::placeholder(kind)],
        };
        let elevations = images("ElevationImage", ImageKind::Elevation);
        let floorplans = images("FloorPlanImage", ImageKind::FloorPlan);
        let interiors = images("InteriorImage", ImageKind::Interior);

        let featured_image = elevations
            .first()
            .map(|img| img.src.trim().to_string())
            .unwrap_or_default();

        Ok(Plan {
            headline: el.text_or("MarketingHeadline", format!("Welcome to {}", node.name)),
            description: el.text_or_blank("Description"),
            available: !el.flag("PlanNotAvailable"),
            actual_price,
            base_price: base_price(actual_price),
            base_sqft: el.text_or_blank("BaseSqft"),
            website: el.text_or_blank("PlanWebsite"),
            nhs_website: el.text_or_blank("NHSPlanWebsite"),
            virtual_tour: el.text_or_blank("VirtualTour"),
            design_center_link: el.text_or_blank("EnvisionDesignCenter"),
            stories: el.text_or_blank("Stories"),
            baths: format_baths(el.count("Baths")?, el.count("HalfBaths")?),
            bedrooms: el.text_or_blank("Bedrooms"),
            garage: el.text_or_blank("Garage"),
            dining_areas: el.text_or_blank("DiningAreas"),
            has_basement: el.flag("Basement"),
            living_areas: GroupedCounts::from_elements("LivingArea", el.children("LivingArea"))?,
            amenities: GroupedCounts::from_elements("PlanAmenity", el.children("PlanAmenity"))?,
            elevations,
            floorplans,
            interiors,
            featured_image,
            leads_phone: subdivision.office.phone.clone(),
            leads_email: subdivision.leads_email.clone(),
            hours: subdivision.office.hours.clone(),
            address: subdivision.address.clone(),
            builder_ids: Vec::new(),
            subdivision_ids: Vec::new(),
            lookup_slug,
            slug,
            external_id,
            node,
        })
    }

    /// Elevations, then floor plans, then interiors (placeholders skipped)
    pub fn all_images(&self) -> Vec<&ImageRecord> {
        self.elevations
            .iter()
            .chain(self.floorplans.iter())
            .chain(self.interiors.iter())
            .filter(|img| !img.is_placeholder())
            .collect()
    }
}

impl Entity for Plan {
    fn kind(&self) -> EntityKind {
        EntityKind::Plan
    }

    fn node(&self) -> &Node {
        &self.node
    }

    fn external_id(&self) -> Option<ExternalId> {
        self.external_id
    }
}

// ============================================================================
// TESTS
// ============================================================================
