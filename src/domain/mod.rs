// Domain layer: sizing models and the collaborator ports the engine talks to.

pub mod model;
pub mod ports;
