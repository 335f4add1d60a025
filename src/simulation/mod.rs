//! In-memory collaborators and scenario tooling for tests, benchmarks and
//! the command-line tool.

pub mod custody;
pub mod pool_manager;
pub mod scenario;
