use time::macros::datetime;
use time::OffsetDateTime;

/// The latest date-time RFC 6265 lets us put in an `Expires` attribute.
pub(crate) const MAX_DATETIME: OffsetDateTime = datetime!(9999-12-31 23:59:59 UTC);

/// A cookie's expiration: either a date-time or session.
///
/// [`CookieAttributes`] store the expiration as a Unix timestamp, where `0`
/// means "session". `Expiration` is the typed view of that timestamp:
///
/// ```rust
/// use amaretti::Expiration;
/// use amaretti::time::OffsetDateTime;
///
/// assert_eq!(Expiration::from_timestamp(0), Expiration::Session);
///
/// let expires = Expiration::from_timestamp(-1);
/// assert_eq!(
///     expires.datetime(),
///     Some(OffsetDateTime::from_unix_timestamp(-1).unwrap())
/// );
/// ```
///
/// An `Expiration` is also constructible with `Expiration::from()` via any of:
///
///   * `None` -> `Expiration::Session`
///   * `Some(OffsetDateTime)` -> `Expiration::DateTime`
///   * `OffsetDateTime` -> `Expiration::DateTime`
///
/// [`CookieAttributes`]: crate::CookieAttributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expiration {
    /// Expiration for a "permanent" cookie at a specific date-time.
    DateTime(OffsetDateTime),
    /// Expiration for a "session" cookie. Browsers define the notion of a
    /// "session" and will automatically expire session cookies when they deem
    /// the "session" to be over. This is typically, but need not be, when the
    /// browser is closed.
    Session,
}

impl Expiration {
    /// Interprets an absolute Unix timestamp: `0` is a session cookie, anything
    /// else a date-time.
    ///
    /// Timestamps beyond what an `Expires` attribute can carry are clamped to
    /// `9999-12-31 23:59:59 UTC` (or to the Unix epoch, for very negative ones).
    pub fn from_timestamp(timestamp: i64) -> Self {
        if timestamp == 0 {
            return Expiration::Session;
        }
        let datetime = match OffsetDateTime::from_unix_timestamp(timestamp) {
            Ok(datetime) => std::cmp::min(datetime, MAX_DATETIME),
            Err(_) if timestamp < 0 => OffsetDateTime::UNIX_EPOCH,
            Err(_) => MAX_DATETIME,
        };
        Expiration::DateTime(datetime)
    }

    /// Returns `true` if `self` is an `Expiration::DateTime`.
    pub fn is_datetime(&self) -> bool {
        match self {
            Expiration::DateTime(_) => true,
            Expiration::Session => false,
        }
    }

    /// Returns `true` if `self` is an `Expiration::Session`.
    pub fn is_session(&self) -> bool {
        match self {
            Expiration::DateTime(_) => false,
            Expiration::Session => true,
        }
    }

    /// Returns the inner `OffsetDateTime` if `self` is a `DateTime`.
    pub fn datetime(self) -> Option<OffsetDateTime> {
        match self {
            Expiration::Session => None,
            Expiration::DateTime(v) => Some(v),
        }
    }
}

impl<T: Into<Option<OffsetDateTime>>> From<T> for Expiration {
    fn from(option: T) -> Self {
        match option.into() {
            Some(value) => Expiration::DateTime(value),
            None => Expiration::Session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Expiration, MAX_DATETIME};
    use time::OffsetDateTime;

    #[test]
    fn zero_is_session() {
        assert!(Expiration::from_timestamp(0).is_session());
        assert!(Expiration::from(None).is_session());
    }

    #[test]
    fn past_and_future_are_datetimes() {
        let past = Expiration::from_timestamp(-1);
        assert!(past.is_datetime());
        assert!(past.datetime().unwrap() < OffsetDateTime::UNIX_EPOCH);

        let future = Expiration::from_timestamp(1_700_000_000);
        assert_eq!(
            future.datetime().unwrap().unix_timestamp(),
            1_700_000_000
        );
    }

    #[test]
    fn out_of_range_is_clamped() {
        assert_eq!(
            Expiration::from_timestamp(i64::MAX).datetime(),
            Some(MAX_DATETIME)
        );
        assert_eq!(
            Expiration::from_timestamp(i64::MIN).datetime(),
            Some(OffsetDateTime::UNIX_EPOCH)
        );
        // Representable by `time`, but too far in the future for a cookie.
        assert_eq!(
            Expiration::from_timestamp(300_000_000_000).datetime(),
            Some(MAX_DATETIME)
        );
    }
}
