pub mod keys;
pub mod views;
