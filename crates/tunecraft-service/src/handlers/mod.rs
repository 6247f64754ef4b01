//! API handlers.

pub mod credits;
pub mod generate;
pub mod health;
pub mod pages;
