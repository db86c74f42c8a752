pub mod auth;
pub mod cli_args;
pub mod error;
mod extractor;
mod middleware;
pub mod observer;
mod openapi;
mod route;
pub mod server;
pub mod service;
mod state;
pub mod types;
mod utils;

#[cfg(test)]
mod test;
