pub mod controller;
pub mod settings;

pub use controller::PageController;
pub use settings::{ConfigError, Settings};
