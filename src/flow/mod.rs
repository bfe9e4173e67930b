pub mod actions;
pub mod state;
