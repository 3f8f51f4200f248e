//! citysim-core: the simulation engine behind the city dashboard.
//!
//! A caller-driven tick advances a single city state through time-of-day
//! patterns, random noise, policy rollouts and city events, and records a
//! bounded history per metric. See `engine` for the tick order.

pub mod budget_subsystem;
pub mod city;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod event_subsystem;
pub mod history;
pub mod impact;
pub mod metric;
pub mod noise_subsystem;
pub mod pattern_subsystem;
pub mod policy_subsystem;
pub mod rng;
pub mod snapshot;
pub mod subsystem;
pub mod types;
