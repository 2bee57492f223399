//! Travel recommendation backend.
//!
//! Survey answers become a weighted tag profile ([`services::ProfileBuilder`]),
//! which is scored against the curated destination/tag table
//! ([`services::run_recommendation`]) to produce a ranked list of destinations.
//! Accounts, JWT authentication and catalog browsing sit around that core.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
