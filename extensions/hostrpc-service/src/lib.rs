mod method_definition;
pub use method_definition::*;
