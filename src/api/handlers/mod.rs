pub mod auth;
pub mod notices;
pub mod root;
