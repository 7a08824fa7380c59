//! Sensitive data marker for automatic redaction
//!
//! Patient identifiers (email, phone, free-text clinical values) flow through
//! every layer of the engine. `Sensitive<T>` keeps them out of log output and
//! error displays while still letting the owning code read them.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use chartx_core_types::Sensitive;
///
/// let email = Sensitive::new("jane@example.com");
/// println!("{:?}", email); // Prints: ***REDACTED***
/// println!("{}", email);   // Prints: ***REDACTED***
///
/// // Access the actual value when needed
/// assert_eq!(email.expose(), &"jane@example.com");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Use this only where the value itself is needed, e.g. as a query
    /// parameter. Never pass the exposed value to a log macro.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
