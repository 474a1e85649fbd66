pub mod auth;
pub mod services;
pub mod usage_logs;
pub mod users;
