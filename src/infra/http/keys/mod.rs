mod handlers;
mod panels;

pub use handlers::key_settings_page;
