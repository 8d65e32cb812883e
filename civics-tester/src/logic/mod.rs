pub mod learner;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use learner::{OutagePlan, PlaythroughPlan, PlaythroughSummary};
pub use seeds::resolve_seed_inputs;
pub use tester::*;
