pub mod error;
pub mod key_settings;
pub mod repos;
