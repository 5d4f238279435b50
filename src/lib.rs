//! Lotto recommender: 6-of-45 number recommendation with latest-round
//! discovery.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod stats;
pub mod strategy;
pub mod selection;
pub mod quality;
pub mod discovery;
pub mod engine;
pub mod storage;
