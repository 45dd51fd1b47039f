pub mod assistant;
pub mod checkin;
pub mod clock;
pub mod config;
pub mod item;
pub mod stats;
pub mod tag;
