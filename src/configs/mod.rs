pub mod base;
pub mod fetch;
pub mod logging;
pub mod server;
pub mod sources;

pub use base::*;
pub use fetch::*;
pub use logging::*;
pub use server::*;
pub use sources::*;
