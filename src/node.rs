//! heap nodes backing a [`Queue`](crate::Queue).

#[cfg(feature = "nightly")]
use core::alloc::{AllocError, Allocator, Layout};
use core::ptr::{self, NonNull};

#[cfg(feature = "allocator-api2")]
use allocator_api2::alloc::{AllocError, Allocator, Layout};

/// a singly-linked node: one element and its successor, null when last.
pub(crate) struct Node<T> {
  pub(crate) next: *mut Self,
  pub(crate) elem: T,
}

impl<T> Node<T> {
  const LAYOUT: Layout = Layout::new::<Self>();

  /// allocate a node in `alloc` holding `elem`, with no successor.
  ///
  /// on allocation failure the element is handed back to the caller.
  pub(crate) fn alloc_in<A>(
    elem: T,
    alloc: &A,
  ) -> Result<NonNull<Self>, (T, AllocError)>
  where
    A: Allocator,
  {
    match alloc.allocate(Self::LAYOUT).map(NonNull::cast::<Self>) {
      // SAFETY: a fresh, valid allocation of `Self::LAYOUT`.
      Ok(nn) => unsafe {
        let ptr = nn.as_ptr();
        (&raw mut (*ptr).next).write(ptr::null_mut());
        (&raw mut (*ptr).elem).write(elem);
        Ok(nn)
      },
      Err(err) => Err((elem, err)),
    }
  }

  /// release the node back to `alloc`, returning the element it held.
  ///
  /// # safety
  ///
  /// `node` must be a live node obtained from `alloc` via
  /// [`Node::alloc_in`], already unlinked from its chain, and must not be
  /// consumed twice.
  pub(crate) unsafe fn consume_in<A>(node: *mut Self, alloc: &A) -> T
  where
    A: Allocator,
  {
    unsafe {
      let elem = (&raw mut (*node).elem).read();
      alloc.deallocate(NonNull::new_unchecked(node).cast(), Self::LAYOUT);
      elem
    }
  }
}
