//! owlog dashboard - tables, statistics and day/week plots for one-wire
//! sensor logs.
//!
//! This library exposes the core modules for testing and reuse.

pub mod analysis;
pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod routes;
pub mod services;
pub mod views;
