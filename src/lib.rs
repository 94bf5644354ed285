pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod export;
pub mod model;
pub mod models;
pub mod qr;
pub mod repository;
pub mod routes;
pub mod service;
pub mod utils;
pub mod views;
