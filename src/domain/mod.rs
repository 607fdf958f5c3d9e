// Domain layer: core models and ports (interfaces). No network or runtime code here.

pub mod model;
pub mod ports;
