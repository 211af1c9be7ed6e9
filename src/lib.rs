mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod mapper;
    pub mod memory;
    pub mod model;
    pub mod postgres;
    pub mod repository;
    pub mod schema;
    pub mod store;
    pub mod validation;
}
mod constants;

pub mod cdn;
pub mod config;
pub mod routes;
pub mod sitemap;
pub mod slug;
pub mod view;

pub use constants::*;
pub use database::*;
