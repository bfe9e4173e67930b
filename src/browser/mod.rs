pub mod driver;
pub mod engine;
pub mod session;
pub mod viewport;
