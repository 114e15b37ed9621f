pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod export;
pub mod feeds;
pub mod present;
pub mod signals;
pub mod state;
pub mod wallet;
