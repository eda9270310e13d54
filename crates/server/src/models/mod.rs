pub mod follow;
pub mod listing;
pub mod message;
pub mod user;
