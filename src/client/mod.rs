pub mod dmi;
pub mod error;
pub mod query;
