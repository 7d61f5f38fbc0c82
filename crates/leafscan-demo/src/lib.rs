pub mod acquire;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod state;
pub mod telemetry;
pub mod transient;

pub use acquire::*;
pub use cli::*;
pub use config::*;
pub use server::*;
pub use state::*;
