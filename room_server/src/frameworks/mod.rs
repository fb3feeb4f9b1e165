// Frameworks layer: process bootstrap, configuration and database wiring.

pub mod config;
pub mod db;
pub mod server;
