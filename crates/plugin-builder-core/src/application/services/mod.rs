//! Application services - orchestrate use cases.
//!
//! Services coordinate the loaders, the domain layer and the ports to
//! carry out `init`, `update` and `dump`.

pub mod build_service;
pub mod init_service;

pub use build_service::{BuildReport, BuildService};
pub use init_service::InitService;
