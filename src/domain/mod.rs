pub mod memory;
pub mod review;

pub use memory::MemoryState;
pub use review::{
  Preview, RawRating, Rating, ReplayEntry, ReviewEvent, ReviewOutcome, ReviewRequest,
};
