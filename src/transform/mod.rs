//! Column transformation module.
//!
//! Table-specific coercion, sign and labeling rules:
//! - Rules: shared code sets, amount coercion, sign flip, sequence ids
//! - Dock: tolerant amount coercion, debit-code sign flip
//! - Matera: strict amount parsing, document cleanup, canonical rename

pub mod dock;
pub mod matera;
pub mod rules;

pub use dock::transform_dock;
pub use matera::transform_matera;
pub use rules::*;
