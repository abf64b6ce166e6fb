//! Field model
//!
//! Records are never inspected by reflection. Each model type registers its
//! fields once, as typed accessors, and every filter, search and sort goes
//! through that registry.

mod registry;
mod value;

pub use registry::{Accessor, FieldDecl, FieldDef, FieldRegistry};
pub use value::{FieldKind, FieldValue};
