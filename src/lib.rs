//! AlgoQuest · Codeforces problem acquisition backend (library side).
//!
//! The binaries (`algoquest-backend`, `build-snapshot`) are thin shells over
//! the modules declared here.

pub mod telemetry;
pub mod error;
pub mod config;
pub mod domain;
pub mod protocol;
pub mod tags;
pub mod retry;
pub mod codeforces;
pub mod cache;
pub mod mapper;
pub mod snapshot;
pub mod state;
pub mod logic;
pub mod routes;
