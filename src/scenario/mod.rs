pub mod context;
pub mod matrix;
pub mod runner;
pub mod scenario_model;
