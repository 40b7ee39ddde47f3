//! Client for a remote face-recognition service: enroll persons into a
//! person group, train it, then identify and verify faces against it.

pub mod pipeline;
pub mod recognition;
pub mod shared;

#[cfg(test)]
pub(crate) mod testing;
