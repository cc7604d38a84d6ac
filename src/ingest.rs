// 🔄 Entity Builder - one feed document → one Snapshot
//
// Strictly top-down, direct children only:
//   Builders → Corporation → Builder → Subdivision → Plan
//
// Any identity field missing anywhere aborts the whole document: matching and
// relationship wiring downstream assume complete hierarchies, so no partial
// Snapshot is ever returned.

use crate::config::IngestOptions;
use crate::entities::{Builder, Company, Plan, Subdivision};
use crate::error::Result;
use crate::parser::{parse_document, FeedElement};
use crate::snapshot::{Adjacency, Edge, Snapshot};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Ingest feed text held in memory
pub fn ingest(text: &str, options: &IngestOptions) -> Result<Snapshot> {
    let doc = parse_document(text)?;
    let root = FeedElement::new(doc.root_element(), "Builders");

    let mut pass = IngestPass::new(options);
    for corporation in root.children_as("Corporation", "Company") {
        pass.company(&corporation)?;
    }

    let snapshot = pass.finish();
    info!(
        builders = snapshot.builders.len(),
        subdivisions = snapshot.subdivisions.len(),
        plans = snapshot.plans.len(),
        "Feed ingested"
    );
    Ok(snapshot)
}

/// Ingest a feed file. The file is read fully before parsing starts.
pub fn ingest_file(path: &Path, options: &IngestOptions) -> Result<Snapshot> {
    let text = fs::read_to_string(path)?;
    let mut snapshot = ingest(&text, options)?;
    snapshot.source = Some(path.display().to_string());
    debug!(source = %path.display(), "Snapshot built");
    Ok(snapshot)
}

/// Ingest the current and (optionally) previous feed side by side
///
/// The two runs share only the read-only options, so the previous document is
/// built on a scoped thread while the current one builds on this thread.
pub fn ingest_pair(
    current: &Path,
    previous: Option<&Path>,
    options: &IngestOptions,
) -> Result<(Snapshot, Option<Snapshot>)> {
    std::thread::scope(|scope| {
        let previous_run = previous.map(|path| scope.spawn(move || ingest_file(path, options)));
        let current = ingest_file(current, options)?;
        let previous = match previous_run {
            Some(handle) => Some(
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?,
            ),
            None => None,
        };
        Ok((current, previous))
    })
}

// ============================================================================
// INGEST PASS
// ============================================================================

/// State of one traversal. Consumed by `finish`.
struct IngestPass<'o> {
    options: &'o IngestOptions,
    snapshot: Snapshot,
    adjacency: Adjacency,
    builder_count: usize,
    subdivision_count: usize,
    plan_count: usize,
}

impl<'o> IngestPass<'o> {
    fn new(options: &'o IngestOptions) -> Self {
        IngestPass {
            options,
            snapshot: Snapshot::default(),
            adjacency: Adjacency::new(),
            builder_count: 0,
            subdivision_count: 0,
            plan_count: 0,
        }
    }

    fn company(&mut self, el: &FeedElement<'_, '_>) -> Result<()> {
        let company = Company::from_feed(el)?;
        for builder in el.children_as("Builder", "Builder") {
            self.builder(&builder, &company)?;
        }
        Ok(())
    }

    fn builder(&mut self, el: &FeedElement<'_, '_>, company: &Company) -> Result<()> {
        let ordinal = self.builder_count;
        self.builder_count += 1;

        let mut builder = Builder::from_feed(el, company, self.options)?;
        if builder.external_id.is_none() {
            warn!(slug = %builder.slug, "Builder has no catalogue id");
        }

        for subdivision in el.children_as("Subdivision", "Subdivision") {
            self.subdivision(&subdivision, &builder, ordinal)?;
        }

        builder.subdivision_ids = self.adjacency.take(Edge::BuilderSubdivisions, ordinal);
        builder.plan_ids = self.adjacency.take(Edge::BuilderPlans, ordinal);
        self.snapshot.builders.push(builder);
        Ok(())
    }

    fn subdivision(
        &mut self,
        el: &FeedElement<'_, '_>,
        builder: &Builder,
        builder_ordinal: usize,
    ) -> Result<()> {
        let ordinal = self.subdivision_count;
        self.subdivision_count += 1;

        let mut subdivision = Subdivision::from_feed(el, builder, self.options)?;
        if subdivision.external_id.is_none() {
            warn!(slug = %subdivision.slug, "Subdivision has no catalogue id");
        }

        self.adjacency
            .link(Edge::BuilderSubdivisions, builder_ordinal, subdivision.external_id);
        self.adjacency
            .link(Edge::SubdivisionBuilders, ordinal, builder.external_id);

        for plan in el.children_as("Plan", "Plan") {
            self.plan(&plan, builder, builder_ordinal, &subdivision, ordinal)?;
        }

        subdivision.builder_ids = self.adjacency.take(Edge::SubdivisionBuilders, ordinal);
        subdivision.plan_ids = self.adjacency.take(Edge::SubdivisionPlans, ordinal);
        self.snapshot.subdivisions.push(subdivision);
        Ok(())
    }

    fn plan(
        &mut self,
        el: &FeedElement<'_, '_>,
        builder: &Builder,
        builder_ordinal: usize,
        subdivision: &Subdivision,
        subdivision_ordinal: usize,
    ) -> Result<()> {
        let ordinal = self.plan_count;
        self.plan_count += 1;

        let mut plan = Plan::from_feed(el, subdivision, self.options)?;
        if plan.external_id.is_none() {
            warn!(slug = %plan.lookup_slug, "Plan has no catalogue id");
        }

        self.adjacency
            .link(Edge::BuilderPlans, builder_ordinal, plan.external_id);
        self.adjacency
            .link(Edge::SubdivisionPlans, subdivision_ordinal, plan.external_id);
        self.adjacency
            .link(Edge::PlanBuilders, ordinal, builder.external_id);
        self.adjacency
            .link(Edge::PlanSubdivisions, ordinal, subdivision.external_id);

        plan.builder_ids = self.adjacency.take(Edge::PlanBuilders, ordinal);
        plan.subdivision_ids = self.adjacency.take(Edge::PlanSubdivisions, ordinal);
        self.snapshot.plans.push(plan);
        Ok(())
    }

    fn finish(self) -> Snapshot {
        debug_assert!(self.adjacency.is_empty());
        self.snapshot
    }
}

// ============================================================================
// TESTS
// ============================================================================
