//! Film catalog with likes-based popularity ranking and a friendship
//! request/confirm protocol between users.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
