// src/lib.rs

//! matchlog Scraper Library
//!
//! Data flows one way: fetch a page, extract raw rows, normalize them against
//! a schema, optionally join ratings, and append to a CSV file.

pub mod error;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
