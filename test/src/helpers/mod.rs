pub mod harness;

pub use harness::{Harness, PENDING_IDENTITY};
