// Shared feed fixtures for unit tests

use crate::config::IngestOptions;
use crate::ingest::ingest;
use crate::resolver::{lookup_slug, Catalogue, CatalogueEntry, ExternalId, ResolutionPolicy};
use crate::snapshot::Snapshot;

pub const BUILDER_ID: ExternalId = ExternalId(100);
pub const SUBDIVISION_ID: ExternalId = ExternalId(200);

/// One builder, one subdivision, one `<Plan>` per `(name, base price)`
pub fn feed(plans: &[(&str, &str)]) -> String {
    let plans: String = plans
        .iter()
        .enumerate()
        .map(|(i, (name, price))| {
            format!(
                "<Plan PlanID=\"P{i}\"><PlanNumber>{i}</PlanNumber><PlanName>{name}</PlanName>\
                 <BasePrice>{price}</BasePrice></Plan>"
            )
        })
        .collect();

    format!(
        r#"<Builders>
  <Corporation CorporationID="C1">
    <CorporateBuilderNumber>900</CorporateBuilderNumber>
    <CorporateName>Acme Corp</CorporateName>
    <Builder BuilderID="B1">
      <BuilderNumber>11</BuilderNumber>
      <BrandName>Lakeside Homes</BrandName>
      <Subdivision SubdivisionID="S1">
        <SubdivisionNumber>21</SubdivisionNumber>
        <SubdivisionName>Riverbend</SubdivisionName>
        {plans}
      </Subdivision>
    </Builder>
  </Corporation>
</Builders>"#
    )
}

/// Exact catalogue covering the fixture builder, subdivision and `plan_names`
pub fn options(plan_names: &[&str]) -> IngestOptions {
    let mut entries = vec![
        CatalogueEntry {
            slug: "b1-lakeside-homes".to_string(),
            id: BUILDER_ID,
        },
        CatalogueEntry {
            slug: "s1-riverbend".to_string(),
            id: SUBDIVISION_ID,
        },
    ];
    entries.extend(plan_names.iter().enumerate().map(|(i, name)| CatalogueEntry {
        slug: lookup_slug("Riverbend", name),
        id: ExternalId(300 + i as u64),
    }));

    IngestOptions {
        catalogue: Catalogue::new(entries, ResolutionPolicy::Exact),
        ..IngestOptions::default()
    }
}

/// Ingest `feed(plans)` with a catalogue covering `catalogued` plan names
pub fn snapshot(plans: &[(&str, &str)], catalogued: &[&str], source: &str) -> Snapshot {
    let mut snapshot = ingest(&feed(plans), &options(catalogued)).unwrap();
    snapshot.source = Some(source.to_string());
    snapshot
}
