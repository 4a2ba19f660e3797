//! Completes a meter's benchmark year from incomplete readings.

pub mod electricity;
pub mod estimation;
pub mod gas;
pub mod seasonal;
pub mod session;
pub mod targeting;
pub mod window;
