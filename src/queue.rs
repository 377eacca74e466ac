//! the queue itself.

#[cfg(all(feature = "nightly", feature = "alloc"))]
use alloc::alloc::Global;
#[cfg(feature = "nightly")]
use core::alloc::Allocator;
use core::iter::FusedIterator;
use core::ptr;

#[cfg(all(feature = "allocator-api2", feature = "alloc"))]
use allocator_api2::alloc::Global;
#[cfg(feature = "allocator-api2")]
use allocator_api2::alloc::Allocator;

use crate::error::Error;
use crate::node::Node;

/// a singly-linked FIFO queue.
#[cfg(not(feature = "alloc"))]
pub struct Queue<T, A>
where
  A: Allocator,
{
  alloc: A,
  head: *mut Node<T>,
  tail: *mut Node<T>,
  len: usize,
  dispose: Option<fn(T)>,
}

/// a singly-linked FIFO queue.
#[cfg(feature = "alloc")]
pub struct Queue<T, A = Global>
where
  A: Allocator,
{
  alloc: A,
  head: *mut Node<T>,
  tail: *mut Node<T>,
  len: usize,
  dispose: Option<fn(T)>,
}

// SAFETY: the queue is the sole owner of its node chain, and a shared
// reference only ever hands out `&T`, so the usual container bounds apply.
#[rustfmt::skip]
unsafe impl<T, A> Send for Queue<T, A>
where T: Send, A: Allocator + Send {}
#[rustfmt::skip]
unsafe impl<T, A> Sync for Queue<T, A>
where T: Sync, A: Allocator + Sync {}

#[cfg(feature = "alloc")]
impl<T> Queue<T, Global> {
  /// create an empty queue.
  ///
  /// elements left in the queue at teardown are dropped in place; use
  /// [`Queue::with_dispose`] to run a callback on them instead.
  pub const fn new() -> Self {
    Self::new_in(Global)
  }

  /// create an empty queue bound to a disposal callback.
  ///
  /// the callback receives every element still queued when the queue is
  /// torn down, exactly once per element. elements handed out by
  /// [`Queue::dequeue`] belong to the caller and never reach the callback.
  pub const fn with_dispose(dispose: fn(T)) -> Self {
    Self::with_dispose_in(dispose, Global)
  }
}

// public APIs
impl<T, A> Queue<T, A>
where
  A: Allocator,
{
  /// create an empty queue with a given allocator.
  pub const fn new_in(alloc: A) -> Self {
    Self {
      alloc,
      head: ptr::null_mut(),
      tail: ptr::null_mut(),
      len: 0,
      dispose: None,
    }
  }

  /// create an empty queue with a disposal callback and a given allocator.
  pub const fn with_dispose_in(dispose: fn(T), alloc: A) -> Self {
    Self {
      alloc,
      head: ptr::null_mut(),
      tail: ptr::null_mut(),
      len: 0,
      dispose: Some(dispose),
    }
  }

  /// the number of queued elements.
  pub const fn len(&self) -> usize {
    self.len
  }

  /// check if the queue is empty.
  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// borrow the front element without removing it.
  pub fn peek(&self) -> Option<&T> {
    // SAFETY: when non-null, `head` points at a live node we own.
    unsafe { self.head.as_ref().map(|node| &node.elem) }
  }

  /// append an element at the tail.
  ///
  /// for the non-panicking variant, see [`Queue::try_enqueue`].
  pub fn enqueue(&mut self, elem: T) {
    self
      .try_enqueue(elem)
      .map_err(|(_, err)| err)
      .expect("enqueue failed");
  }

  /// try to append an element at the tail, returning it back alongside the
  /// error on allocation failure. the queue is unchanged on failure.
  pub fn try_enqueue(&mut self, elem: T) -> Result<(), (T, Error)> {
    let node = match Node::alloc_in(elem, &self.alloc) {
      Ok(nn) => nn.as_ptr(),
      Err((elem, err)) => return Err((elem, Error::Alloc(err))),
    };

    if self.head.is_null() {
      self.head = node;
    } else {
      // SAFETY: a non-empty queue's `tail` points at its last live node.
      unsafe { (*self.tail).next = node };
    }
    self.tail = node;
    self.len += 1;
    Ok(())
  }

  /// remove the front element and hand it to the caller.
  ///
  /// the caller owns the returned element; the disposal callback is not
  /// involved. fails with [`Error::Empty`] on an empty queue, removing
  /// nothing.
  pub fn dequeue(&mut self) -> Result<T, Error> {
    let old_head = self.head;
    if old_head.is_null() {
      return Err(Error::Empty);
    }

    // SAFETY: `old_head` is the live front node.
    self.head = unsafe { (*old_head).next };
    if self.head.is_null() {
      self.tail = ptr::null_mut();
    } else if unsafe { (*self.head).next }.is_null() {
      // implied by the chain invariant; kept as a guard against future
      // mutators that break tail tracking.
      debug_assert_eq!(self.tail, self.head);
    }
    self.len -= 1;

    // SAFETY: unlinked above, nothing else refers to it.
    Ok(unsafe { Node::consume_in(old_head, &self.alloc) })
  }

  /// remove every element, disposing of each one.
  ///
  /// elements go to the disposal callback when one was supplied at
  /// construction, and are dropped in place otherwise. the queue stays
  /// usable afterwards.
  pub fn clear(&mut self) {
    while let Ok(elem) = self.dequeue() {
      match self.dispose {
        Some(dispose) => dispose(elem),
        None => drop(elem),
      }
    }
  }

  /// tear the queue down, disposing of any residual elements as in
  /// [`Queue::clear`], then release the queue itself.
  ///
  /// dropping the queue is equivalent; taking `self` by value makes the
  /// teardown explicit and leaves stale handles unrepresentable.
  pub fn destroy(self) {}
}

#[cfg(feature = "alloc")]
impl<T> Default for Queue<T, Global> {
  /// create an empty queue.
  fn default() -> Self {
    Self::new()
  }
}

impl<T, A> Drop for Queue<T, A>
where
  A: Allocator,
{
  /// dispose of all remaining elements and their nodes.
  fn drop(&mut self) {
    self.clear();
  }
}

impl<T, A> Extend<T> for Queue<T, A>
where
  A: Allocator,
{
  fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
    for elem in iter {
      self.enqueue(elem);
    }
  }
}

#[cfg(feature = "alloc")]
impl<T> FromIterator<T> for Queue<T, Global> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut queue = Self::new();
    queue.extend(iter);
    queue
  }
}

/// a draining iterator over a [`Queue`], in FIFO order.
///
/// elements it yields belong to the caller; elements still queued when the
/// iterator is dropped are disposed of as in [`Queue::clear`].
#[cfg(not(feature = "alloc"))]
pub struct IntoIter<T, A>
where
  A: Allocator,
{
  queue: Queue<T, A>,
}

/// a draining iterator over a [`Queue`], in FIFO order.
///
/// elements it yields belong to the caller; elements still queued when the
/// iterator is dropped are disposed of as in [`Queue::clear`].
#[cfg(feature = "alloc")]
pub struct IntoIter<T, A = Global>
where
  A: Allocator,
{
  queue: Queue<T, A>,
}

impl<T, A> Iterator for IntoIter<T, A>
where
  A: Allocator,
{
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.queue.dequeue().ok()
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.queue.len(), Some(self.queue.len()))
  }
}

#[rustfmt::skip]
impl<T, A> ExactSizeIterator for IntoIter<T, A>
where A: Allocator {}
#[rustfmt::skip]
impl<T, A> FusedIterator for IntoIter<T, A>
where A: Allocator {}

impl<T, A> IntoIterator for Queue<T, A>
where
  A: Allocator,
{
  type Item = T;
  type IntoIter = IntoIter<T, A>;

  fn into_iter(self) -> IntoIter<T, A> {
    IntoIter { queue: self }
  }
}

#[cfg(test)]
mod tests {
  use core::ptr::NonNull;
  use core::sync::atomic::AtomicUsize;
  use core::sync::atomic::Ordering::SeqCst;

  #[cfg(feature = "nightly")]
  use core::alloc::{AllocError, Allocator, Layout};

  #[cfg(feature = "allocator-api2")]
  use allocator_api2::alloc::{AllocError, Allocator, Layout};

  use super::{Error, Queue};

  /// an allocator that always fails.
  struct NoAlloc;

  unsafe impl Allocator for NoAlloc {
    fn allocate(&self, _: Layout) -> Result<NonNull<[u8]>, AllocError> {
      Err(AllocError)
    }

    unsafe fn deallocate(&self, _: NonNull<u8>, _: Layout) {}
  }

  #[test]
  fn fifo_order_with_sizes() {
    let mut queue = Queue::new();
    assert!(queue.is_empty());

    for n in 1..=3 {
      queue.enqueue(n);
    }
    assert_eq!(queue.len(), 3);
    assert!(!queue.is_empty());

    assert_eq!(queue.dequeue(), Ok(1));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.dequeue(), Ok(2));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.dequeue(), Ok(3));
    assert_eq!(queue.len(), 0);
    assert!(queue.is_empty());

    assert_eq!(queue.dequeue(), Err(Error::Empty));
    assert_eq!(queue.len(), 0);
  }

  #[test]
  fn fifo_order_across_interleavings() {
    let mut queue = Queue::new();
    queue.enqueue('a');
    queue.enqueue('b');
    assert_eq!(queue.dequeue(), Ok('a'));
    queue.enqueue('c');
    queue.enqueue('d');
    assert_eq!(queue.dequeue(), Ok('b'));
    assert_eq!(queue.dequeue(), Ok('c'));
    queue.enqueue('e');
    assert_eq!(queue.dequeue(), Ok('d'));
    assert_eq!(queue.dequeue(), Ok('e'));
    assert_eq!(queue.dequeue(), Err(Error::Empty));
  }

  #[test]
  fn peek_is_non_destructive() {
    let mut queue = Queue::new();
    assert_eq!(queue.peek(), None);

    queue.enqueue(1);
    queue.enqueue(2);
    assert_eq!(queue.peek(), Some(&1));
    assert_eq!(queue.peek(), Some(&1));
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.dequeue(), Ok(1));
    assert_eq!(queue.peek(), Some(&2));
  }

  #[test]
  fn enqueue_surfaces_allocation_failure() {
    let mut queue = Queue::new_in(NoAlloc);
    let (elem, err) = queue.try_enqueue(7).unwrap_err();
    assert_eq!(elem, 7);
    assert_eq!(err, Error::Alloc(AllocError));
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
  }

  #[test]
  fn destroy_runs_dispose_once_per_residual_element() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    fn dispose(_: &str) {
      CALLS.fetch_add(1, SeqCst);
    }

    let mut queue = Queue::with_dispose(dispose as fn(&'static str));
    queue.enqueue("a");
    queue.enqueue("b");
    queue.destroy();
    assert_eq!(CALLS.load(SeqCst), 2);
  }

  #[test]
  fn dequeued_elements_skip_the_dispose_callback() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    fn dispose(_: u8) {
      CALLS.fetch_add(1, SeqCst);
    }

    let mut queue = Queue::with_dispose(dispose as fn(u8));
    queue.enqueue(1);
    queue.enqueue(2);
    assert_eq!(queue.dequeue(), Ok(1));
    drop(queue);
    assert_eq!(CALLS.load(SeqCst), 1);
  }

  #[test]
  fn teardown_without_dispose_drops_elements_in_place() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);
    struct Counted;
    impl Drop for Counted {
      fn drop(&mut self) {
        DROPS.fetch_add(1, SeqCst);
      }
    }

    let mut queue = Queue::new();
    for _ in 0..3 {
      queue.enqueue(Counted);
    }
    assert_eq!(DROPS.load(SeqCst), 0);
    drop(queue);
    assert_eq!(DROPS.load(SeqCst), 3);
  }

  #[test]
  fn clear_leaves_a_reusable_queue() {
    let mut queue = Queue::new();
    queue.enqueue(1);
    queue.enqueue(2);
    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(queue.dequeue(), Err(Error::Empty));

    queue.enqueue(3);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.dequeue(), Ok(3));
  }

  #[test]
  fn draining_iteration_preserves_fifo_order() {
    let queue: Queue<i32> = (1..=5).collect();
    assert_eq!(queue.len(), 5);

    let mut iter = queue.into_iter();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.next(), Some(1));
    assert_eq!(iter.len(), 4);
    assert!(iter.eq(2..=5));
  }

  #[test]
  fn extend_appends_at_the_tail() {
    let mut queue = Queue::new();
    queue.enqueue(0);
    queue.extend(1..=2);
    assert_eq!(queue.dequeue(), Ok(0));
    assert_eq!(queue.dequeue(), Ok(1));
    assert_eq!(queue.dequeue(), Ok(2));
  }
}
