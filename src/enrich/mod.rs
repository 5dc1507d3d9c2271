mod orchestrator;
mod outcome;

pub use orchestrator::{category_label, Orchestrator};
pub use outcome::{PlacedLabel, QueryKind, QueryOutcome, QueryPayload, RouteOutcome};
