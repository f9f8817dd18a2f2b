//! Plain data records shared by the swarmfield crates.

pub mod reaction;

pub use reaction::{ConstantBasis, Reaction, Term};
