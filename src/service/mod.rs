pub mod cascade;
pub mod file_service;
pub mod notification_service;
pub mod pricing_service;
pub mod quote_service;
pub mod rate_cache;
