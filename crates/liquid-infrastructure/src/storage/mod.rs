//! Storage layer: whole-file TOML documents, the record format and secure erase.

mod app_config_dto;
mod secure_erase;
mod toml_document;

pub use app_config_dto::{AppConfigDto, ProxyDto};
pub use secure_erase::{SecureEraseError, secure_erase};
pub use toml_document::{FileMode, TomlDocument, TomlFileError};
