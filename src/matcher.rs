// 🔍 Cross-Snapshot Matcher - find the same plan in another snapshot
//
// Feed ids are regenerated upstream, so a plan is identified across snapshots by
// its compound key (name, builder ids, subdivision ids). "No match" is a normal
// outcome: the plan is new.

use crate::entities::{Entity, Plan};
use crate::resolver::ExternalId;

/// Compound key a plan is matched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanKey<'a> {
    pub name: &'a str,
    pub builder_ids: &'a [ExternalId],
    pub subdivision_ids: &'a [ExternalId],
}

impl<'a> PlanKey<'a> {
    pub fn of(plan: &'a Plan) -> Self {
        PlanKey {
            name: &plan.node.name,
            builder_ids: &plan.builder_ids,
            subdivision_ids: &plan.subdivision_ids,
        }
    }
}

/// First candidate whose compound key equals the target's
pub fn match_plan<'a>(target: &Plan, candidates: &'a [Plan]) -> Option<&'a Plan> {
    let key = PlanKey::of(target);
    candidates.iter().find(|candidate| PlanKey::of(candidate) == key)
}

/// First candidate resolved to `target`
pub fn match_by_external_id<T: Entity>(target: ExternalId, candidates: &[T]) -> Option<&T> {
    candidates
        .iter()
        .find(|candidate| candidate.external_id() == Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{snapshot, BUILDER_ID, SUBDIVISION_ID};

    #[test]
    fn test_match_plan_is_reflexive() {
        let snap = snapshot(
            &[("Aspen", "450000"), ("Birch", "500000")],
            &["Aspen", "Birch"],
            "current",
        );
        for plan in &snap.plans {
            let found = match_plan(plan, &snap.plans).unwrap();
            assert_eq!(found, plan);
        }
    }

    #[test]
    fn test_match_plan_ignores_feed_ids_and_prices() {
        let previous = snapshot(&[("Birch", "480000"), ("Aspen", "440000")], &[], "previous");
        let current = snapshot(&[("Aspen", "450000")], &[], "current");

        // Feed ids differ (P1 vs P0); the compound key still matches
        let found = match_plan(&current.plans[0], &previous.plans).unwrap();
        assert_eq!(found.node.name, "Aspen");
        assert_eq!(found.actual_price, 440_000);
        assert_ne!(found.node.id, current.plans[0].node.id);
    }

    #[test]
    fn test_match_plan_not_found() {
        let previous = snapshot(&[("Aspen", "450000")], &[], "previous");
        let current = snapshot(&[("Cedar", "450000")], &[], "current");
        assert!(match_plan(&current.plans[0], &previous.plans).is_none());
        assert!(match_plan(&current.plans[0], &[]).is_none());
    }

    #[test]
    fn test_match_plan_requires_same_relationships() {
        let previous = snapshot(&[("Aspen", "450000")], &[], "previous");
        let mut current = snapshot(&[("Aspen", "450000")], &[], "current");
        current.plans[0].builder_ids.push(ExternalId(999));
        assert!(match_plan(&current.plans[0], &previous.plans).is_none());
    }

    #[test]
    fn test_match_by_external_id() {
        let snap = snapshot(&[("Aspen", "450000")], &["Aspen"], "current");

        let builder = match_by_external_id(BUILDER_ID, &snap.builders).unwrap();
        assert_eq!(builder.name(), "Lakeside Homes");

        let subdivision = match_by_external_id(SUBDIVISION_ID, &snap.subdivisions).unwrap();
        assert_eq!(subdivision.name(), "Riverbend");

        let plan = match_by_external_id(ExternalId(300), &snap.plans).unwrap();
        assert_eq!(plan.name(), "Aspen");

        assert!(match_by_external_id(ExternalId(1), &snap.builders).is_none());
    }
}
