pub mod exception;
pub mod library;
pub mod notification;
