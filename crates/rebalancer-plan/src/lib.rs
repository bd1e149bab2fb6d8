//! Canonical execution plans and fallback bundles.
//!
//! A canonical plan is the deterministic, hashable commitment artifact for
//! one chosen route: fixed field order, canonical numeric representation,
//! Keccak-256 content hash over the serialized form. Alongside the plan, a
//! ranked shortlist of fallback routes is derived from the remaining scored
//! candidates.

pub mod canonical;
pub mod fallbacks;
pub mod planner;
pub mod types;

pub use canonical::build_plan;
pub use fallbacks::{build_fallbacks, build_fallbacks_from_raw};
pub use planner::plan_from_candidates;
pub use types::{
	CanonicalPlan, FallbackSummary, PlanArtifact, PlanError, PlanExecution, PlanHop,
	PlanMetadata, PlanOptions, PlanningOutcome,
};
