pub mod camera_store;
pub mod error;
pub mod store;

pub use camera_store::CameraStateStore;
pub use error::PersistError;
pub use store::{KeyValueStore, MemoryStore};
