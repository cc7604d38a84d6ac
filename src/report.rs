// 📋 Change Report - current snapshot vs. previous, plan by plan
//
// For every current plan: its builder and subdivision names (when the plan's
// catalogue links resolve), whether it is new since the previous snapshot, and
// its price string from the delta calculator.

use crate::entities::{Entity, Plan};
use crate::matcher::{match_by_external_id, match_plan};
use crate::pricing::delta;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const ADDED_MARKER: &str = " [ + ADDED ]";

const SEPARATOR: &str = "----------------------------------------";

// ============================================================================
// REPORT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub builder_name: Option<String>,
    pub subdivision_name: Option<String>,
    pub plan_name: String,
    /// No plan with the same compound key in the previous snapshot
    pub added: bool,
    pub price_changed: bool,
    pub price: String,
    /// Slugs of the plan's non-placeholder images
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub source: String,
    pub plan_count: usize,
}

impl SnapshotHeader {
    fn of(snapshot: &Snapshot) -> Self {
        SnapshotHeader {
            source: snapshot.source_label().to_string(),
            plan_count: snapshot.plans.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub current: SnapshotHeader,
    pub previous: Option<SnapshotHeader>,
    pub entries: Vec<ChangeEntry>,
}

impl ChangeReport {
    /// Walk the current plans in snapshot order
    ///
    /// With no previous snapshot nothing is flagged as added: there is no
    /// baseline to be new against.
    pub fn compare(current: &Snapshot, previous: Option<&Snapshot>) -> Self {
        let entries = current
            .plans
            .iter()
            .map(|plan| {
                let previous_plan = previous.and_then(|prev| match_plan(plan, &prev.plans));
                entry(current, plan, previous.is_some(), previous_plan)
            })
            .collect();

        ChangeReport {
            current: SnapshotHeader::of(current),
            previous: previous.map(SnapshotHeader::of),
            entries,
        }
    }

    pub fn added_count(&self) -> usize {
        self.entries.iter().filter(|e| e.added).count()
    }

    pub fn changed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.price_changed).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} plans, {} added, {} price changes",
            self.entries.len(),
            self.added_count(),
            self.changed_count()
        )
    }
}

fn entry(
    current: &Snapshot,
    plan: &Plan,
    has_baseline: bool,
    previous_plan: Option<&Plan>,
) -> ChangeEntry {
    let builder_name = plan
        .builder_ids
        .first()
        .and_then(|id| match_by_external_id(*id, &current.builders))
        .map(|b| b.name().to_string());
    let subdivision_name = plan
        .subdivision_ids
        .first()
        .and_then(|id| match_by_external_id(*id, &current.subdivisions))
        .map(|s| s.name().to_string());

    ChangeEntry {
        builder_name,
        subdivision_name,
        plan_name: plan.node.name.clone(),
        added: has_baseline && previous_plan.is_none(),
        price_changed: previous_plan.is_some_and(|prev| prev.actual_price != plan.actual_price),
        price: delta(previous_plan, plan),
        images: plan.all_images().iter().map(|img| img.slug.clone()).collect(),
    }
}

// ============================================================================
// TEXT RENDERING
// ============================================================================

impl fmt::Display for SnapshotHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} plans found in {}", self.plan_count, self.source)
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.builder_name {
            writeln!(f, "{}", name)?;
        }
        if let Some(name) = &self.subdivision_name {
            writeln!(f, "{}", name)?;
        }
        let marker = if self.added { ADDED_MARKER } else { "" };
        writeln!(f, "{}{}", self.plan_name, marker)?;
        writeln!(f, "{}", self.price)?;
        if !self.images.is_empty() {
            writeln!(f, "IMG:")?;
            for slug in &self.images {
                writeln!(f, "{}", slug)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ChangeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(previous) = &self.previous {
            writeln!(f, "{}", previous)?;
        }
        writeln!(f, "{}", self.current)?;
        writeln!(f, "{}", SEPARATOR)?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        write!(f, "{}", self.summary())
    }
}
