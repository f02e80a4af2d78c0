pub mod api;
pub mod app_error;
pub mod app_state;
pub mod bootstrap;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod navigation;
pub mod orders;
pub mod price;
pub mod routes;
pub mod schema;
pub mod store;
pub mod swagger;
