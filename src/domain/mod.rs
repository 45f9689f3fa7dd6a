// Domain layer: models and the ports the watcher talks through.

pub mod model;
pub mod ports;
