pub mod common;
pub mod configs;
pub mod fetch;
pub mod relay;
pub mod server;
pub mod sources;
pub mod streams;
pub mod transport;
