//! Exam seat allocation: distributes roll-list candidates over room desk grids
//! following a named traversal pattern, and reports overflow and per-branch counts.

pub mod allocation;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod parser;
pub mod request;
pub mod web;

pub use allocation::{allocate, AllocationResult, CandidatePair, Pattern, RoomDescriptor};
pub use error::SeatingError;
