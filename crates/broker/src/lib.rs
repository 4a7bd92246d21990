pub mod config;
pub mod facet;
pub mod http_api;
pub mod store;
