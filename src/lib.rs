pub mod cache;
pub mod cli;
pub mod clients;
pub mod error;
pub mod locations;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod utils;
pub mod writers;

pub use error::{CollectorError, Result};
