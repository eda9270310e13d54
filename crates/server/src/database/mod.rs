pub mod commands;
pub mod connection;
pub mod queries;
pub mod schema;
pub mod utils;
