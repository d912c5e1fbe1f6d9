// Domain layer: records, slug rules and the ports the orchestrators talk through.

pub mod model;
pub mod ports;
pub mod slug;
