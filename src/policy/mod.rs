pub mod movement;

pub use movement::{LinkEstimate, MovementPolicy, StepOutcome, DEFAULT_STEP_LENGTH};
