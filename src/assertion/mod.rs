pub mod evaluator;
pub mod expectation;
pub mod wait;
