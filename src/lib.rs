pub mod app;
pub mod config;
pub mod content;
pub mod db;
pub mod gate;
pub mod handlers;
pub mod paths;
pub mod quiz;
pub mod session;
pub mod state;
pub mod visitor;

#[cfg(test)]
mod testing;
