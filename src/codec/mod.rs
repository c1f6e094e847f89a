//! Codec module - the tagged-value representation and byte writer.
//!
//! This module provides the building blocks every message builder uses:
//!
//! - [`Variant`]/[`Value`]/[`VType`] - the closed tagged-value type system
//! - [`MessageWriter`] - offset-tracking writer with alignment padding
//!
//! # Design
//!
//! The variant type system is a closed enumeration matched exhaustively at
//! compile time. Wrapper bits ([`VT_VECTOR`], [`VT_ARRAY`]) are mutually
//! exclusive with each other and orthogonal to the base type.
//!
//! # Example
//!
//! ```
//! use wsp_client::codec::{Value, Variant, VType, VT_VECTOR};
//!
//! let v = Variant::Vector {
//!     ty: VType::I4,
//!     elems: vec![Value::I4(1)],
//! };
//! assert_eq!(v.tag(), VType::I4.code() | VT_VECTOR);
//! ```

mod variant;
mod writer;

pub use variant::{AddressingMode, Decimal, Value, Variant, VType, VT_ARRAY, VT_VECTOR};
pub use writer::MessageWriter;
