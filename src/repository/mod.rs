pub mod db;
pub mod file_repo;
pub mod material_price_repo;
pub mod notification_repo;
pub mod quote_notification_repo;
pub mod quote_repo;
pub mod repository_error;
