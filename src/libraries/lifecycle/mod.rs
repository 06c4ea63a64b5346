//! Service lifecycle functions

mod heart;

pub use heart::{DeathReason, Heart, HeartStone};
