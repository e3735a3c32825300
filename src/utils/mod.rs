//! Shared utilities: token generation, URL normalization, password hashing,
//! user-agent parsing.

pub mod password;
pub mod short_token;
pub mod url_normalizer;
pub mod user_agent;
