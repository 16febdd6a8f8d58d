// Domain layer: core models and ports (interfaces). No external dependencies beyond serde/chrono/indexmap.

pub mod model;
pub mod ports;
