// src/lib.rs

//! Modulbaukasten Crawler Library

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
