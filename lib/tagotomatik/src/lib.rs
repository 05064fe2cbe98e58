pub mod backend;
pub mod config;
pub mod correction;
pub mod diff;
pub mod error;
pub mod exceptions;
pub mod fields;
pub mod notify;
pub mod reconcile;
pub mod scope;
pub mod services;
pub mod state;
pub mod status;
pub mod store;
pub mod traits;

pub use config::AppConfig;
pub use error::{LibraryError, Result};
pub use services::{Services, ServicesBuilder};
pub use traits::{ExceptionBackend, LibraryBackend};
