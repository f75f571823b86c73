//! Cooperative cancellation for long-running expansions.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::ExpandError;
use crate::Result;

/// A cloneable cancellation flag.
///
/// Clones share the same flag, so a caller keeps one handle and passes
/// another into [`ExpandOptions`](crate::ExpandOptions). Expanders poll it
/// before every archive entry and after every copied chunk.
///
/// # Examples
///
/// ```
/// use unspool_core::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(token.check().is_ok());
///
/// handle.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation has been requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fails with [`ExpandError::Cancelled`] once cancellation has been
    /// requested.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ExpandError::Cancelled);
        }
        Ok(())
    }
}
