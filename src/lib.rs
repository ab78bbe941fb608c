//! Browse the TMDB popular TV list page by page, with an offline cache that
//! takes over when the network is unreachable.

pub mod app;
pub mod cache;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
pub mod event;
pub mod logging;
pub mod render;
pub mod settings;
pub mod tmdb;
