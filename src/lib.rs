pub mod configuration;
pub mod connectors;
pub mod db;
pub mod errors;
pub mod forms;
pub mod health;
pub mod helpers;
pub mod ingress;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod startup;
pub mod state;
pub mod store;
pub mod telemetry;
