// Creature Waves Schema - catalog record definitions
// These are the typed shapes the engine reads out of the public catalog
// service. Every field the service may omit is an explicit Option with a
// documented default on the accessor.

pub use creature::*;
pub use element_types::*;
pub use evolution::*;
pub use move_record::*;
pub use resource::*;

pub mod creature;
pub mod element_types;
pub mod evolution;
pub mod move_record;
pub mod resource;
