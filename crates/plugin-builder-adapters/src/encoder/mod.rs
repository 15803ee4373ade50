//! Document encoders.

mod yaml;

pub use yaml::YamlEncoder;
