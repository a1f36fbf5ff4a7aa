//! Anonymous, optionally password-protected text notes
//!
//! The library exposes the note core (repository, view accounting, fraud
//! heuristic, service) and the axum router built on it.

pub mod aggregator;
pub mod config;
pub mod database;
pub mod error;
pub mod fraud;
pub mod handler;
pub mod model;
pub mod repository;
pub mod route;
pub mod service;
pub mod views;
