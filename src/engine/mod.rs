//! The engine ties registry, selection, enrichment and overlay together.

mod engine;
mod journey;

pub use engine::{Engine, EngineEvent, Notice};
pub use journey::{JourneyOutcome, JourneySummary};
