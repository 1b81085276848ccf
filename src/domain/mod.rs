// Domain layer: document model and ports. No rendering or transport dependencies.

pub mod model;
pub mod ports;
