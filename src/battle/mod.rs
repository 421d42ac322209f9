pub mod calculators;
pub mod capture;
pub mod commands;
pub mod engine;
pub mod state;
pub mod stats;
