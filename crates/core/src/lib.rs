//! Core drafting logic. Keep this crate free of IO and platform concerns.

pub mod assoc;
pub mod cards;
pub mod deck;
pub mod discard;
pub mod events;
pub mod rng;
pub mod rules;
pub mod session;
pub mod sets;
pub mod weights;

pub use assoc::*;
pub use cards::*;
pub use deck::*;
pub use discard::*;
pub use events::*;
pub use rng::*;
pub use rules::*;
pub use session::*;
pub use sets::*;
pub use weights::*;
