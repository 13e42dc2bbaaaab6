//! Small value types shared by tools and components.

pub mod min_max;
