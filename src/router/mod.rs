pub mod auth_router;
pub mod file_router;
pub mod notification_router;
pub mod pricing_router;
pub mod quote_router;
