//! Catalog admin server library.
//!
//! Users, categories, products and product images behind an actix-web API,
//! with uploaded image files kept on local disk.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
