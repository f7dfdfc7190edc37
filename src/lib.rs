// src/lib.rs

pub mod storage;
pub mod service;
pub mod api;
pub mod render;
pub mod app_state;
pub mod config;
pub mod logging;
pub mod server;
