//! Venta Libre Bolivia, a marketplace client for the terminal.
//!
//! Pages are routed by path through `venta_nexus::Router`; data comes from
//! the REST API through [`api::HttpClient`], or from a local generator for
//! the product catalog.

pub mod api;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod filters;
pub mod logging;
pub mod mock;
pub mod model;
pub mod pages;
