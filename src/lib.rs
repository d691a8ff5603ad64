// src/lib.rs

//! confgrep: a local database of top-4 security conference papers

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
