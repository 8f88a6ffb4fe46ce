//! attainment-core: outcome attainment calculation engine.
//!
//! Turns per-question student marks into course outcome (CO) attainment
//! levels, rolls those up into program outcome (PO) direct attainment
//! through the CO-PO mapping matrix, and blends direct with indirect
//! attainment into a final score per PO.

pub mod aggregator;
pub mod calculator;
pub mod cohort;
pub mod combiner;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod report;
