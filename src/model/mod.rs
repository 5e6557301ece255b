pub mod file;
pub mod material_price;
pub mod notification;
pub mod quote;
pub mod quote_notification;
