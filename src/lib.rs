pub mod fpl_fetch;
pub mod gameweeks;
pub mod h2h;
pub mod http_cache;
pub mod http_client;
pub mod models;
pub mod plan_store;
pub mod projection;
pub mod provider;
pub mod seed;
pub mod state;
