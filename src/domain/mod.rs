// Domain layer: result model and the port lookups are run against.

pub mod model;
pub mod ports;
