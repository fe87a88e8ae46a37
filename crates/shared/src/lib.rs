pub mod agent;
pub mod config;
pub mod detail;
pub mod epoch;
pub mod error;
pub mod heat;
pub mod models;
pub mod normalize;
pub mod projection;
pub mod timer;
pub mod viewport;
