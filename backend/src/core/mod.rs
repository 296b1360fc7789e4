//! Simulated time: working-hours calendar and decay clock

pub mod calendar;
pub mod time;
