pub mod instance_lock;
pub mod paths;
pub mod settings;
pub mod storage;
pub mod toml_app_repository;

pub use crate::instance_lock::{InstanceClaim, InstanceLock};
pub use crate::paths::{LiquidPaths, PathError};
pub use crate::settings::LiquidSettings;
pub use crate::toml_app_repository::TomlAppConfigRepository;
