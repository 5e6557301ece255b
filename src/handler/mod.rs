pub mod auth_handler;
pub mod file_handler;
pub mod notification_handler;
pub mod pricing_handler;
pub mod quote_handler;
