//! Output generation: configuration documents and Python scaffolding.

pub mod document;
pub mod render;
pub mod scaffold;

pub use document::{daemon_document, module_document, record_document, scenario_document};
pub use render::RenderContext;
pub use scaffold::{BANNER, ScaffoldOptions, constructor_parameters, scaffold};
