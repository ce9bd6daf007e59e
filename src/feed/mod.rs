//! Incremental image feed: paginated search state and accumulation.

mod controller;

pub use controller::{FeedController, PageRequest};
