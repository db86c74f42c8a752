pub mod bearer_token;
pub mod json;
pub mod path;
pub mod principal;
