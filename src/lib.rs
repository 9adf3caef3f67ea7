pub mod api;
pub mod auth;
pub mod config;
pub mod decoders;
pub mod domain;
pub mod logging;
pub mod router;
pub mod terminal;
