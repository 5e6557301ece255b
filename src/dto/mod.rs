pub mod auth_dto;
pub mod file_dto;
pub mod notification_dto;
pub mod pricing_dto;
pub mod quote_dto;
