//! Extension traits over math types.

pub mod transform;
