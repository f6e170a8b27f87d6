//! Thread-local tracking of the active [`TypeResolver`].
//!
//! serde offers no way to pass context into `Deserialize` impls, so
//! [`Polymorphic`](crate::Polymorphic) looks up the innermost resolver entered
//! on the current thread. Fatal resolution failures are recorded on the frame
//! so the caller can tell them apart from ordinary deserialization errors.

use crate::error::ResolveError;
use crate::resolver::TypeResolver;
use core::cell::RefCell;
use core::marker::PhantomData;

struct Frame {
    resolver: TypeResolver,
    failure: Option<ResolveError>,
}

thread_local! {
    static ACTIVE: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Guard returned by [`TypeResolver::enter`]. The resolver stays active on
/// this thread until the guard is dropped.
#[must_use = "the resolver is only active while the scope is alive"]
pub struct ResolverScope {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl core::fmt::Debug for ResolverScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolverScope")
            .field("depth", &self.depth)
            .finish()
    }
}

impl ResolverScope {
    pub(crate) fn push(resolver: TypeResolver) -> Self {
        let depth = ACTIVE.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(Frame {
                resolver,
                failure: None,
            });
            stack.len()
        });
        Self {
            depth,
            _not_send: PhantomData,
        }
    }

    /// Takes the most recent fatal resolution failure recorded since the scope
    /// was entered (or since the last call).
    ///
    /// A surrounding `#[serde(untagged)]` enum may recover from a failure, so
    /// callers should drain the frame after every deserialization and compare
    /// the failure with the error that actually came back.
    pub fn take_failure(&self) -> Option<ResolveError> {
        ACTIVE.with(|stack| {
            stack
                .borrow_mut()
                .get_mut(self.depth - 1)
                .and_then(|frame| frame.failure.take())
        })
    }
}

impl Drop for ResolverScope {
    fn drop(&mut self) {
        ACTIVE.with(|stack| stack.borrow_mut().truncate(self.depth - 1));
    }
}

/// Returns the innermost active resolver, if any.
pub(crate) fn active() -> Option<TypeResolver> {
    ACTIVE.with(|stack| stack.borrow().last().map(|frame| frame.resolver.clone()))
}

/// Records a failure on the innermost frame, replacing any earlier one.
pub(crate) fn record_failure(err: ResolveError) {
    ACTIVE.with(|stack| {
        if let Some(frame) = stack.borrow_mut().last_mut() {
            frame.failure = Some(err);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_is_active_until_dropped() {
        assert!(active().is_none());
        let resolver = TypeResolver::new();
        {
            let _scope = resolver.enter();
            assert!(active().is_some());
        }
        assert!(active().is_none());
    }

    #[test]
    fn failures_land_on_innermost_scope() {
        let resolver = TypeResolver::new();
        let outer = resolver.enter();
        {
            let inner = resolver.enter();
            record_failure(ResolveError::unresolved("a::IFirst"));
            record_failure(ResolveError::unresolved("a::ISecond"));
            assert_eq!(
                inner.take_failure(),
                Some(ResolveError::unresolved("a::ISecond"))
            );
            assert_eq!(inner.take_failure(), None);
        }
        assert_eq!(outer.take_failure(), None);
    }
}
