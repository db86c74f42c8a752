pub mod book;
pub mod book_id;
pub mod principal;
pub mod used_bearer_token;
