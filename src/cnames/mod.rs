//! Column-name handling: the built-in spelling tables and the resolver that turns a
//! raw header plus user options into one canonical-name mapping.
//!
//! Everything in here is pure; no chunk is read until a `CnameResolution` exists.

pub mod defaults;
pub mod resolver;

pub use defaults::{describe_cname, is_signed_stat, normalize_name};
pub use resolver::{resolve, CnameResolution};
