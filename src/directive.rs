use crate::attributes::InvalidCookieError;
use crate::CookieAttributes;
use std::fmt;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// `Day, DD-Mon-YYYY HH:MM:SS GMT`
static EXPIRES_FORMAT: &[FormatItem<'_>] = format_description!(
    "[weekday repr:short], [day]-[month repr:short]-[year] [hour]:[minute]:[second] GMT"
);

/// Turns [`CookieAttributes`] into the value of a `Set-Cookie` header.
///
/// Attributes are emitted in a fixed order:
/// `name=value; Expires=..; Max-Age=..; Path=..; Domain=..; Secure; HttpOnly`.
/// `Expires` and `Max-Age` are only emitted for non-session cookies, `Max-Age`
/// being computed relative to the instant passed to [`Directive::at()`]
/// (the current time by default).
///
/// # Example
///
/// ```rust
/// use amaretti::{CookieAttributes, Directive};
///
/// let attrs = CookieAttributes::new("a").set_value("b");
/// assert_eq!(Directive::new(&attrs).build().unwrap(), "a=b; Path=/; HttpOnly");
/// ```
///
/// A removal directive is a directive with an empty value and an expiry in the past:
///
/// ```rust
/// use amaretti::{CookieAttributes, Directive};
///
/// let attrs = CookieAttributes::new("a").set_value("").set_expiry(-1);
/// assert_eq!(
///     Directive::new(&attrs).build().unwrap(),
///     "a=; Expires=Wed, 31-Dec-1969 23:59:59 GMT; Max-Age=0; Path=/; HttpOnly"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Directive<'a> {
    attributes: &'a CookieAttributes,
    now: Option<OffsetDateTime>,
}

impl<'a> Directive<'a> {
    pub fn new(attributes: &'a CookieAttributes) -> Self {
        Directive {
            attributes,
            now: None,
        }
    }

    /// Computes `Max-Age` relative to `now` instead of the current system time.
    pub fn at(mut self, now: OffsetDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Returns the number of seconds the cookie should live for, `None` for a
    /// session cookie.
    ///
    /// It is never negative: cookies whose expiry is in the past get `0`.
    pub fn max_age(&self) -> Option<i64> {
        if self.attributes.expiry == 0 {
            return None;
        }
        let now = self
            .now
            .unwrap_or_else(OffsetDateTime::now_utc)
            .unix_timestamp();
        Some(self.attributes.expiry.saturating_sub(now).max(0))
    }

    /// Validates the cookie and returns the header value.
    pub fn build(&self) -> Result<String, InvalidCookieError> {
        self.attributes.validate()?;
        Ok(self.to_string())
    }

    fn fmt_parameters(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let attributes = self.attributes;

        if let Some(expires) = attributes.expiration().datetime() {
            let expires = expires.to_offset(UtcOffset::UTC);
            write!(
                f,
                "; Expires={}",
                expires.format(&EXPIRES_FORMAT).map_err(|_| fmt::Error)?
            )?;
        }

        if let Some(max_age) = self.max_age() {
            write!(f, "; Max-Age={}", max_age)?;
        }

        if let Some(path) = attributes.path().filter(|p| !p.is_empty()) {
            write!(f, "; Path={}", path)?;
        }

        if let Some(domain) = attributes.domain().filter(|d| !d.is_empty()) {
            write!(f, "; Domain={}", domain)?;
        }

        if attributes.secure_only() {
            write!(f, "; Secure")?;
        }

        if attributes.http_only() {
            write!(f, "; HttpOnly")?;
        }

        Ok(())
    }
}

impl fmt::Display for Directive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}={}",
            self.attributes.name(),
            self.attributes.value().unwrap_or_default()
        )?;
        self.fmt_parameters(f)
    }
}
