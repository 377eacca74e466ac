//! the queue's error taxonomy.

#[cfg(feature = "nightly")]
use core::alloc::AllocError;

#[cfg(feature = "allocator-api2")]
use allocator_api2::alloc::AllocError;
use thiserror::Error;

/// everything that can go wrong when operating on a
/// [`Queue`](crate::Queue).
///
/// every error is reported synchronously to the immediate caller; nothing
/// is retried internally.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// storage for a queue node could not be obtained.
  #[error("queue node allocation failed")]
  Alloc(AllocError),

  /// a dequeue was attempted on a queue holding no elements.
  #[error("dequeue from an empty queue")]
  Empty,
}
