//! Helper coordination service: events, helper slots, signups and comments
//! behind an admin/ownership gate, with a calendar export per event.

pub mod actions;
pub mod auth;
pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
