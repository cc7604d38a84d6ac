// 🏘️ Subdivision Entity - a community a builder sells plans in

use super::builder::Builder;
use super::media::{format_images, ImageKind, ImageRecord};
use super::node::{Entity, EntityKind, Node};
use crate::config::IngestOptions;
use crate::error::Result;
use crate::parser::FeedElement;
use crate::resolver::{filter_name, node_slug, ExternalId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OFFICE_HOURS: &str = "Contact us for our location hours.";

// ============================================================================
// ADDRESS BLOCKS
// ============================================================================

/// Tag names of one address block; the subdivision and its sales office
/// use the same shape with different prefixes.
struct AddressTags {
    street: &'static str,
    county: &'static str,
    city: &'static str,
    state: &'static str,
    zip: &'static str,
    geocode: &'static str,
    latitude: &'static str,
    longitude: &'static str,
}

const SUBDIVISION_ADDRESS: AddressTags = AddressTags {
    street: "SubStreet1",
    county: "SubCounty",
    city: "SubCity",
    state: "SubState",
    zip: "SubZIP",
    geocode: "SubGeocode",
    latitude: "SubLatitude",
    longitude: "SubLongitude",
};

const OFFICE_ADDRESS: AddressTags = AddressTags {
    street: "Street1",
    county: "County",
    city: "City",
    state: "State",
    zip: "ZIP",
    geocode: "Geocode",
    latitude: "Latitude",
    longitude: "Longitude",
};

/// `(address, geotag)` of an address block
///
/// Address is `"{street}, {city} {state}, {zip}"`, with the county standing in
/// when there is no street tag. Geotag joins every latitude/longitude found.
fn format_location(
    block: Option<FeedElement<'_, '_>>,
    tags: &AddressTags,
    default_geotag: &str,
) -> (String, String) {
    let Some(block) = block else {
        return (String::new(), default_geotag.to_string());
    };

    let locality = block
        .text_of(tags.street)
        .unwrap_or_else(|| block.text_or_blank(tags.county));
    let address = format!(
        "{}, {} {}, {}",
        locality,
        block.text_or_blank(tags.city),
        block.text_or_blank(tags.state),
        block.text_or_blank(tags.zip)
    );

    let mut coords = Vec::new();
    for geocode in block.children(tags.geocode) {
        coords.extend(geocode.text_of(tags.latitude));
        coords.extend(geocode.text_of(tags.longitude));
    }
    let geotag = if coords.is_empty() {
        default_geotag.to_string()
    } else {
        coords.join(", ")
    };

    (address, geotag)
}

// ============================================================================
// SALES OFFICE + SCHOOLS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOffice {
    pub address: String,
    pub geotag: String,
    pub hours: String,
    /// Agent names joined with ", "
    pub agents: String,
    /// `{area}-{prefix}-{suffix}` of the last listed phone
    pub phone: String,
}

impl SalesOffice {
    fn from_feed(block: Option<FeedElement<'_, '_>>, default_geotag: &str) -> Self {
        let (address, geotag) = format_location(
            block.and_then(|office| office.child("Address")),
            &OFFICE_ADDRESS,
            default_geotag,
        );

        let Some(office) = block else {
            return SalesOffice {
                address,
                geotag,
                hours: DEFAULT_OFFICE_HOURS.to_string(),
                agents: String::new(),
                phone: String::new(),
            };
        };

        let hours = match office.text_of("Hours") {
            Some(hours) if !hours.is_empty() => hours.replace(';', ". "),
            _ => DEFAULT_OFFICE_HOURS.to_string(),
        };

        let agents: Vec<String> = office
            .children("Agent")
            .flat_map(|agent| {
                agent
                    .text()
                    .split(" & ")
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        let phone = office
            .last_child("Phone")
            .map(|p| {
                format!(
                    "{}-{}-{}",
                    p.text_or_blank("AreaCode"),
                    p.text_or_blank("Prefix"),
                    p.text_or_blank("Suffix")
                )
            })
            .unwrap_or_default();

        SalesOffice {
            address,
            geotag,
            hours,
            agents: agents.join(", "),
            phone,
        }
    }
}

/// One school district and its de-duplicated school names
///
/// A subdivision without a `Schools` block carries one default (empty) district.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolDistrict {
    pub district: String,
    pub schools: Vec<String>,
}

impl SchoolDistrict {
    pub fn is_placeholder(&self) -> bool {
        self.district.is_empty() && self.schools.is_empty()
    }
}

fn format_schools(el: &FeedElement<'_, '_>) -> Vec<SchoolDistrict> {
    let districts: Vec<SchoolDistrict> = el
        .children("Schools")
        .map(|block| {
            let mut schools: Vec<String> = Vec::new();
            let names = block
                .children("Elementary")
                .chain(block.children("Middle"))
                .chain(block.children("High"))
                .map(|s| s.text());
            for name in names {
                if !schools.contains(&name) {
                    schools.push(name);
                }
            }
            SchoolDistrict {
                district: block.text_or_blank("DistrictName"),
                schools,
            }
        })
        .collect();

    if districts.is_empty() {
        vec![SchoolDistrict::default()]
    } else {
        districts
    }
}

// ============================================================================
// SUBDIVISION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdivision {
    pub node: Node,
    pub slug: String,
    pub external_id: Option<ExternalId>,

    pub status: String,
    pub style: String,
    pub website: String,
    pub design_center_link: String,
    pub video_tour_link: String,
    pub price_low: String,
    pub price_high: String,
    pub sqft_low: String,
    pub sqft_high: String,
    pub directions: String,
    pub description: String,
    pub headline: String,
    pub leads_email: String,

    pub geotag: String,
    pub address: String,
    pub office: SalesOffice,
    pub schools: Vec<SchoolDistrict>,
    pub images: Vec<ImageRecord>,

    // Relationships
    pub builder_ids: Vec<ExternalId>,
    pub plan_ids: Vec<ExternalId>,
}

impl Subdivision {
    pub fn from_feed(
        el: &FeedElement<'_, '_>,
        builder: &Builder,
        options: &IngestOptions,
    ) -> Result<Self> {
        let mut node =
            Node::from_feed(el, "SubdivisionID", "SubdivisionNumber", "SubdivisionName")?;
        node.name = filter_name(&options.name_filters, &node.name);
        let slug = node_slug(&node.id, &node.name);
        let external_id = options.catalogue.resolve(&slug);

        let (address, geotag) =
            format_location(el.child("SubAddress"), &SUBDIVISION_ADDRESS, &options.default_geotag);
        let office = SalesOffice::from_feed(el.last_child("SalesOffice"), &options.default_geotag);

        let images = format_images(ImageKind::Subdivision, &slug, el.children("SubImage"));

        Ok(Subdivision {
            status: el.attr("Status"),
            style: el.text_or_blank("CommunityStyle"),
            website: el.text_or_blank("SubWebsite"),
            design_center_link: el.text_or_blank("EnvisionDesignCenter"),
            video_tour_link: el.text_or_blank("SubVideoTour"),
            price_low: el.attr("PriceLow"),
            price_high: el.attr("PriceHigh"),
            sqft_low: el.attr("SqftLow"),
            sqft_high: el.attr("SqftHigh"),
            directions: el.text_or_blank("DrivingDirections"),
            description: el.text_or_blank("SubDescription"),
            headline: el.text_or("MarketingHeadline", format!("Welcome to {}", node.name)),
            leads_email: el.text_or("SubLeadsEmail", builder.leads_email.clone()),
            geotag,
            address,
            office,
            schools: format_schools(el),
            images,
            builder_ids: Vec::new(),
            plan_ids: Vec::new(),
            slug,
            external_id,
            node,
        })
    }
}

impl Entity for Subdivision {
    fn kind(&self) -> EntityKind {
        EntityKind::Subdivision
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::node::Company;
    use crate::parser::parse_document;

    const FULL: &str = r#"<Builders><Builder BuilderID="B1">
        <BuilderNumber>11</BuilderNumber>
        <BrandName>Lakeside Homes</BrandName>
        <DefaultLeadsEmail>builder@lakeside.example</DefaultLeadsEmail>
        <Subdivision SubdivisionID="S1" Status="Active"
                PriceLow="350000" PriceHigh="520000" SqftLow="1500" SqftHigh="3100">
            <SubdivisionNumber>21</SubdivisionNumber>
            <SubdivisionName>Oak Ridge - Phase 2 Collection</SubdivisionName>
            <CommunityStyle>Traditional</CommunityStyle>
            <SubAddress>
                <SubStreet1>100 Main St</SubStreet1>
                <SubCounty>Placer</SubCounty>
                <SubCity>Roseville</SubCity>
                <SubState>CA</SubState>
                <SubZIP>95678</SubZIP>
                <SubGeocode>
                    <SubLatitude>38.75</SubLatitude><SubLongitude>-121.28</SubLongitude>
                </SubGeocode>
            </SubAddress>
            <SalesOffice>
                <Agent>Ann Lee &amp; Bob Ray</Agent>
                <Agent>Cy Dot</Agent>
                <Phone><AreaCode>916</AreaCode><Prefix>555</Prefix><Suffix>0100</Suffix></Phone>
                <Hours>Mon-Fri 10-6;Sat 10-5</Hours>
                <Address>
                    <County>Placer</County><City>Roseville</City>
                    <State>CA</State><ZIP>95678</ZIP>
                </Address>
            </SalesOffice>
            <Schools>
                <DistrictName>Roseville Joint</DistrictName>
                <Elementary>Oak Elementary</Elementary>
                <Middle>Cedar Middle</Middle>
                <High>Roseville High</High>
                <High>Oak Elementary</High>
            </Schools>
            <SubImage Title="Pool">http://img/pool.jpg</SubImage>
            <Plan PlanID="P1"><MarketingHeadline>Plan headline</MarketingHeadline></Plan>
        </Subdivision>
        <Subdivision SubdivisionID="S2">
            <SubdivisionNumber>22</SubdivisionNumber>
            <SubdivisionName>Bare</SubdivisionName>
        </Subdivision>
    </Builder></Builders>"#;

    fn build_all(options: &IngestOptions) -> Vec<Subdivision> {
        let doc = parse_document(FULL).unwrap();
        let builder_el =
            FeedElement::new(doc.root_element().first_element_child().unwrap(), "Builder");
        let company = Company {
            node: Node {
                id: "C1".to_string(),
                number: "1".to_string(),
                name: "Acme".to_string(),
            },
        };
        let builder = Builder::from_feed(&builder_el, &company, options).unwrap();
        builder_el
            .children_as("Subdivision", "Subdivision")
            .map(|el| Subdivision::from_feed(&el, &builder, options).unwrap())
            .collect()
    }

    #[test]
    fn test_subdivision_full_record() {
        let options = IngestOptions {
            name_filters: vec![" Collection".to_string()],
            ..IngestOptions::default()
        };
        let subs = build_all(&options);
        let sub = &subs[0];

        assert_eq!(sub.node.name, "Oak Ridge  Phase 2");
        assert_eq!(sub.slug, "s1-oak-ridge-phase-2");
        assert_eq!(sub.external_id, None);
        assert_eq!(sub.status, "Active");
        assert_eq!(sub.price_low, "350000");
        assert_eq!(sub.sqft_high, "3100");
        assert_eq!(sub.address, "100 Main St, Roseville CA, 95678");
        assert_eq!(sub.geotag, "38.75, -121.28");
        // Plan's MarketingHeadline is not the subdivision's
        assert_eq!(sub.headline, "Welcome to Oak Ridge  Phase 2");
        assert_eq!(sub.leads_email, "builder@lakeside.example");

        assert_eq!(sub.office.agents, "Ann Lee, Bob Ray, Cy Dot");
        assert_eq!(sub.office.phone, "916-555-0100");
        assert_eq!(sub.office.hours, "Mon-Fri 10-6. Sat 10-5");
        assert_eq!(sub.office.address, "Placer, Roseville CA, 95678");
        assert_eq!(sub.office.geotag, options.default_geotag);

        assert_eq!(sub.schools.len(), 1);
        assert_eq!(sub.schools[0].district, "Roseville Joint");
        assert_eq!(
            sub.schools[0].schools,
            vec!["Oak Elementary", "Cedar Middle", "Roseville High"]
        );

        assert_eq!(sub.images.len(), 1);
        assert_eq!(sub.images[0].slug, "s1-oak-ridge-phase-2-1");
        assert_eq!(sub.images[0].kind, ImageKind::Subdivision);
    }

    #[test]
    fn test_subdivision_defaults() {
        let options = IngestOptions::default();
        let subs = build_all(&options);
        let bare = &subs[1];

        assert_eq!(bare.status, "");
        assert_eq!(bare.address, "");
        assert_eq!(bare.geotag, options.default_geotag);
        assert_eq!(bare.office.hours, DEFAULT_OFFICE_HOURS);
        assert_eq!(bare.office.phone, "");
        assert_eq!(bare.schools, vec![SchoolDistrict::default()]);
        assert!(bare.schools[0].is_placeholder());
        assert_eq!(bare.images.len(), 1);
        assert!(bare.images[0].is_placeholder());
        assert_eq!(bare.description, "");
    }
}
