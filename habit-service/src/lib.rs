//! Habit tracking service: habits, daily completions, a weekly report and a
//! daily reminder run.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod startup;
pub mod utils;
