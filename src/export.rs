// 📤 Export - flattened entity records, PHP list encoding, CSV extracts
//
// Each entity type states its columns up front; rows follow that order.
// List-valued fields go out as PHP serialized arrays, the format the CMS
// importer reads:
//   [1, 2]        → a:2:{i:0;i:1;i:1;i:2;}
//   "Aspen"       → s:5:"Aspen";
//   placeholder   → a:0:{}

use crate::entities::{
    Builder, Entity, EntityKind, GroupedCounts, ImageRecord, Plan, SchoolDistrict, Subdivision,
};
use crate::error::Result;
use crate::registry::{alias_file_name, dated_file_name};
use crate::resolver::ExternalId;
use crate::snapshot::Snapshot;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Exported in place of an unresolved catalogue id
pub const UNRESOLVED_ID: &str = "-1";

// ============================================================================
// PHP SERIALIZATION
// ============================================================================

/// Encode a JSON value as a PHP `serialize()` string
pub fn php_serialize(value: &Value) -> String {
    let mut out = String::new();
    write_php(value, &mut out);
    out
}

fn write_php(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("N;"),
        Value::Bool(b) => out.push_str(if *b { "b:1;" } else { "b:0;" }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                out.push_str(&format!("i:{};", i));
            } else if let Some(u) = n.as_u64() {
                out.push_str(&format!("i:{};", u));
            } else {
                out.push_str(&format!("d:{};", n.as_f64().unwrap_or_default()));
            }
        }
        Value::String(s) => write_php_string(s, out),
        Value::Array(items) => {
            out.push_str(&format!("a:{}:{{", items.len()));
            for (index, item) in items.iter().enumerate() {
                out.push_str(&format!("i:{};", index));
                write_php(item, out);
            }
            out.push('}');
        }
        Value::Object(map) => {
            out.push_str(&format!("a:{}:{{", map.len()));
            for (key, item) in map {
                write_php_string(key, out);
                write_php(item, out);
            }
            out.push('}');
        }
    }
}

/// Length is in bytes, not chars
fn write_php_string(s: &str, out: &mut String) {
    out.push_str(&format!("s:{}:\"{}\";", s.len(), s));
}

fn ids_value(ids: &[ExternalId]) -> Value {
    Value::Array(ids.iter().map(|id| Value::from(id.0)).collect())
}

fn image_value(image: &ImageRecord) -> Value {
    if image.is_placeholder() {
        return json!({});
    }
    json!({
        "src": image.src,
        "slug": image.slug,
        "title": image.title,
        "caption": image.caption,
    })
}

fn images_value<'a>(images: impl IntoIterator<Item = &'a ImageRecord>) -> Value {
    Value::Array(images.into_iter().map(image_value).collect())
}

fn school_value(district: &SchoolDistrict) -> Value {
    if district.is_placeholder() {
        return json!({});
    }
    json!({
        "district": district.district,
        "schools": district.schools,
    })
}

fn counts_value(counts: &GroupedCounts) -> Value {
    let map: Map<String, Value> = counts
        .groups
        .iter()
        .map(|g| (g.kind.clone(), Value::from(g.count)))
        .collect();
    Value::Object(map)
}

fn id_cell(id: Option<ExternalId>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| UNRESOLVED_ID.to_string())
}

fn flag_cell(flag: bool) -> String {
    let cell = if flag { "1" } else { "0" };
    cell.to_string()
}

// ============================================================================
// FLATTEN
// ============================================================================

/// Tabular form of an entity with a fixed column list
pub trait Flatten: Entity {
    const KIND: EntityKind;

    fn columns() -> &'static [&'static str];

    /// One cell per column, in `columns()` order
    fn row(&self) -> Vec<String>;

    /// `(column, cell)` pairs
    fn record(&self) -> Vec<(&'static str, String)> {
        Self::columns().iter().copied().zip(self.row()).collect()
    }
}

impl Flatten for Builder {
    const KIND: EntityKind = EntityKind::Builder;

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "number",
            "name",
            "slug",
            "external_id",
            "corporation_id",
            "corporation_name",
            "corporation_number",
            "website",
            "leads_email",
            "logo_medium",
            "logo_small",
            "reporting_name",
            "copy_leads_email",
            "subdivisions",
            "plans",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.node.id.clone(),
            self.node.number.clone(),
            self.node.name.clone(),
            self.slug.clone(),
            id_cell(self.external_id),
            self.corporation_id.clone(),
            self.corporation_name.clone(),
            self.corporation_number.clone(),
            self.website.clone(),
            self.leads_email.clone(),
            self.logo_medium.clone(),
            self.logo_small.clone(),
            self.reporting_name.clone(),
            self.copy_leads_email.clone(),
            php_serialize(&ids_value(&self.subdivision_ids)),
            php_serialize(&ids_value(&self.plan_ids)),
        ]
    }
}

impl Flatten for Subdivision {
    const KIND: EntityKind = EntityKind::Subdivision;

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "number",
            "name",
            "slug",
            "external_id",
            "status",
            "style",
            "website",
            "design_center_link",
            "video_tour_link",
            "price_low",
            "price_high",
            "sqft_low",
            "sqft_high",
            "directions",
            "description",
            "headline",
            "leads_email",
            "geotag",
            "address",
            "office_address",
            "office_geotag",
            "office_hours",
            "office_agents",
            "office_phone",
            "schools",
            "images",
            "builders",
            "plans",
        ]
    }

    fn row(&self) -> Vec<String> {
        let schools = Value::Array(self.schools.iter().map(school_value).collect());
        vec![
            self.node.id.clone(),
            self.node.number.clone(),
            self.node.name.clone(),
            self.slug.clone(),
            id_cell(self.external_id),
            self.status.clone(),
            self.style.clone(),
            self.website.clone(),
            self.design_center_link.clone(),
            self.video_tour_link.clone(),
            self.price_low.clone(),
            self.price_high.clone(),
            self.sqft_low.clone(),
            self.sqft_high.clone(),
            self.directions.clone(),
            self.description.clone(),
            self.headline.clone(),
            self.leads_email.clone(),
            self.geotag.clone(),
            self.address.clone(),
            self.office.address.clone(),
            self.office.geotag.clone(),
            self.office.hours.clone(),
            self.office.agents.clone(),
            self.office.phone.clone(),
            php_serialize(&schools),
            php_serialize(&images_value(&self.images)),
            php_serialize(&ids_value(&self.builder_ids)),
            php_serialize(&ids_value(&self.plan_ids)),
        ]
    }
}

impl Flatten for Plan {
    const KIND: EntityKind = EntityKind::Plan;

    fn columns() -> &'static [&'static str] {
        &[
            "id",
            "number",
            "name",
            "slug",
            "lookup_slug",
            "external_id",
            "headline",
            "description",
            "available",
            "actual_price",
            "base_price",
            "base_sqft",
            "website",
            "nhs_website",
            "virtual_tour",
            "design_center_link",
            "stories",
            "baths",
            "bedrooms",
            "garage",
            "dining_areas",
            "has_basement",
            "num_living_areas",
            "living_areas",
            "num_amenities",
            "amenities",
            "featured_image",
            "elevations",
            "floorplans",
            "interiors",
            "images",
            "leads_phone",
            "leads_email",
            "hours",
            "address",
            "builders",
            "subdivisions",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.node.id.clone(),
            self.node.number.clone(),
            self.node.name.clone(),
            self.slug.clone(),
            self.lookup_slug.clone(),
            id_cell(self.external_id),
            self.headline.clone(),
            self.description.clone(),
            flag_cell(self.available),
            self.actual_price.to_string(),
            self.base_price.to_string(),
            self.base_sqft.clone(),
            self.website.clone(),
            self.nhs_website.clone(),
            self.virtual_tour.clone(),
            self.design_center_link.clone(),
            self.stories.clone(),
            self.baths.clone(),
            self.bedrooms.clone(),
            self.garage.clone(),
            self.dining_areas.clone(),
            flag_cell(self.has_basement),
            self.living_areas.total().to_string(),
            php_serialize(&counts_value(&self.living_areas)),
            self.amenities.total().to_string(),
            php_serialize(&counts_value(&self.amenities)),
            self.featured_image.clone(),
            php_serialize(&images_value(&self.elevations)),
            php_serialize(&images_value(&self.floorplans)),
            php_serialize(&images_value(&self.interiors)),
            php_serialize(&images_value(self.all_images())),
            self.leads_phone.clone(),
            self.leads_email.clone(),
            self.hours.clone(),
            self.address.clone(),
            php_serialize(&ids_value(&self.builder_ids)),
            php_serialize(&ids_value(&self.subdivision_ids)),
        ]
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Header row plus one row per entity
pub fn write_csv<W: io::Write, T: Flatten>(writer: W, entities: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(T::columns())?;
    for entity in entities {
        wtr.write_record(entity.row())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file<T: Flatten>(path: &Path, entities: &[T]) -> Result<()> {
    let file = fs::File::create(path)?;
    write_csv(file, entities)
}

/// Write the three dated extracts of `snapshot` into `dir`, each followed by
/// its `-current` alias. Returns the dated paths.
pub fn export_snapshot(
    snapshot: &Snapshot,
    dir: &Path,
    client: &str,
    date: NaiveDate,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let written = vec![
        export_kind(dir, client, date, &snapshot.builders)?,
        export_kind(dir, client, date, &snapshot.subdivisions)?,
        export_kind(dir, client, date, &snapshot.plans)?,
    ];
    info!(dir = %dir.display(), files = written.len(), "Snapshot exported");
    Ok(written)
}

fn export_kind<T: Flatten>(
    dir: &Path,
    client: &str,
    date: NaiveDate,
    entities: &[T],
) -> Result<PathBuf> {
    let kind = T::KIND.as_str();
    let dated = dir.join(dated_file_name(client, kind, date, "csv"));
    write_csv_file(&dated, entities)?;
    fs::copy(&dated, dir.join(alias_file_name(client, kind, "csv")))?;
    Ok(dated)
}

// ============================================================================
// TESTS
// ============================================================================
