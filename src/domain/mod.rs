// Domain layer: sale records, chart shapes and the ports the screens depend on.

pub mod model;
pub mod ports;
