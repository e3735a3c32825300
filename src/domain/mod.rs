//! Domain layer: entities, repository contracts, and the visit pipeline.
//!
//! No infrastructure concerns live here. Repository and provider traits
//! define the seams implemented under `crate::infrastructure`; business
//! logic sits in `crate::application::services`.
//!
//! # Visit flow
//!
//! 1. The redirect handler resolves the link and responds immediately
//! 2. A [`visit_event::VisitEvent`] goes onto a bounded channel
//! 3. [`visit_worker::run_visit_worker`] enriches it (user agent, geo) and
//!    persists it via [`repositories::VisitRepository`]

pub mod entities;
pub mod geo;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
