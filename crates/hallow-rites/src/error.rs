//! Error types for the hallow-rites crate.
//!
//! Only catalog loading produces errors. Offering and ritual outcomes at
//! prayer time are ordinary values ([`OfferingVerdict`] and
//! [`RitualAttemptResult`]), never errors.
//!
//! [`OfferingVerdict`]: crate::offering::OfferingVerdict
//! [`RitualAttemptResult`]: crate::ritual::RitualAttemptResult

use hallow_types::DeityDomain;

/// A problem found while loading the offering and ritual catalog.
///
/// Any problem inside a domain's table empties that whole table; the loader
/// itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A table key does not name a deity domain.
    #[error("unknown deity domain {key:?} in {table} table")]
    UnknownDomain {
        /// The offending key.
        key: String,
        /// Which table (`offerings` or `rituals`).
        table: &'static str,
    },

    /// A domain's table did not have the expected shape.
    #[error("malformed {table} table for {domain}: {message}")]
    MalformedTable {
        /// The domain whose table failed to parse.
        domain: DeityDomain,
        /// Which table (`offerings` or `rituals`).
        table: &'static str,
        /// Parser message.
        message: String,
    },

    /// An offering entry failed validation.
    #[error("invalid offering {item:?} for {domain}: {reason}")]
    InvalidOffering {
        /// Domain of the offering.
        domain: DeityDomain,
        /// Item code of the offering.
        item: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A ritual entry failed validation.
    #[error("invalid ritual {code:?} for {domain}: {reason}")]
    InvalidRitual {
        /// Domain of the ritual.
        domain: DeityDomain,
        /// Code of the ritual.
        code: String,
        /// Why it was rejected.
        reason: String,
    },
}
