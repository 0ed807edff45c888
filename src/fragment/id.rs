use derive_more::{Display, From, Into};

/// Identifier of the logical frame a fragment belongs to.
///
/// Identifiers live in a circular 32-bit space: [`FrameId::next`] wraps from
/// `u32::MAX` back to zero. Ordering is only ever decided by equality with
/// the delivery cursor, so the type deliberately does not implement `Ord`.
///
/// # Examples
///
/// ```
/// use defrag::fragment::FrameId;
/// let id = FrameId::new(u32::MAX);
/// assert_eq!(id.next(), FrameId::new(0));
/// assert_eq!(FrameId::new(41).next().get(), 42);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0}")]
pub struct FrameId(u32);

impl FrameId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the inner numeric identifier.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }

    /// Return the identifier that follows this one, modulo 2^32.
    #[must_use]
    pub const fn next(self) -> Self { Self(self.0.wrapping_add(1)) }
}
