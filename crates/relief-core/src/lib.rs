pub mod config;
pub mod constants;
pub mod encode;
pub mod error;
pub mod format;
pub mod route;
pub mod types;

pub use config::{MapConfig, VisualParams};
pub use encode::VisualEncoder;
pub use error::ReliefError;
pub use types::{Population, Year};
