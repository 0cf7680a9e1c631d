//! Command implementations behind the `taurus-reset` binary.

pub mod reset;

pub use reset::reset;
