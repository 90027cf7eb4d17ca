// Abstract submissions: payload validation, SQLite persistence, admin listing and CSV export.

pub mod export;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;
