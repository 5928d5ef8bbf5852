pub mod executor;
pub mod parser;
pub mod service;
pub mod traits;
pub mod types;
