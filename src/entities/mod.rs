// Entity Models - the four-level feed hierarchy
//
// Company → Builder → Subdivision → Plan
//
// Each entity has:
// - Identity triple (feed id, number, name) that must be present
// - Slug + resolved catalogue id
// - Relationship lists holding the catalogue ids of related entities

pub mod node;
pub mod media;
pub mod builder;
pub mod subdivision;
pub mod plan;

pub use node::{Company, Entity, EntityKind, Node};
pub use media::{format_images, GroupedCounts, ImageKind, ImageRecord, TypeCount};
pub use builder::Builder;
pub use subdivision::{SalesOffice, SchoolDistrict, Subdivision};
pub use plan::Plan;
