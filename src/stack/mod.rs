//! Strongly-typed identifiers for build systems and application frameworks.
//!
//! Both enums carry a `Custom(String)` variant so that tags coming back from
//! the generator (or derived from a language name) survive serialization
//! without being coerced into a known value.

#[macro_use]
pub mod id_enum_macro;

pub mod build_system_id;
pub mod framework_id;

pub use build_system_id::BuildSystemId;
pub use framework_id::FrameworkId;
