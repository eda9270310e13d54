pub mod error;
pub mod password;
pub mod token;
