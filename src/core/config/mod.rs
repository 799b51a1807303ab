pub mod data;
pub mod defaults;
pub mod io;
pub mod orchestrator;
pub mod printing;

#[cfg(test)]
mod tests;

pub use data::Config;
pub use defaults::Endpoint;
pub use io::ConfigError;
pub use orchestrator::ConfigOrchestrator;
