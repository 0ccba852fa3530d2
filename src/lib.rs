pub mod cli;
pub mod config;
pub mod download;
pub mod github;
pub mod install;
pub mod platform;
pub mod selector;
pub mod setup;
pub mod types;
