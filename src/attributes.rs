use crate::directive::Directive;
use crate::Expiration;
use std::fmt;

/// The attributes of a cookie the server wants the client to store.
///
/// ## Constructing `CookieAttributes`
///
/// [`CookieAttributes::new()`] sets the defaults: no value, a session expiry,
/// `Path=/`, no domain, `HttpOnly` on and `Secure` off.
///
/// ```rust
/// use amaretti::CookieAttributes;
///
/// let attrs = CookieAttributes::new("name").set_value("value");
/// assert_eq!(attrs.to_string(), "name=value; Path=/; HttpOnly");
/// ```
///
/// ## Building `CookieAttributes`
///
/// Use the `set_*` methods to build more elaborate cookies.
///
/// ```rust
/// use amaretti::CookieAttributes;
///
/// let attrs = CookieAttributes::new("name")
///     .set_value("value")
///     .set_domain("www.rust-lang.org")
///     .set_secure_only(true)
///     .set_http_only(false);
/// assert_eq!(
///     attrs.to_string(),
///     "name=value; Path=/; Domain=www.rust-lang.org; Secure"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    /// The cookie's name.
    pub(crate) name: String,
    /// The cookie's value, `None` if unset.
    pub(crate) value: Option<String>,
    /// Absolute Unix timestamp. `0` for a session cookie.
    pub(crate) expiry: i64,
    /// The cookie's path, if any.
    pub(crate) path: Option<String>,
    /// The cookie's domain, if any.
    pub(crate) domain: Option<String>,
    /// Whether this cookie is marked HttpOnly.
    pub(crate) http_only: bool,
    /// Whether this cookie is marked Secure.
    pub(crate) secure_only: bool,
}

impl CookieAttributes {
    /// Creates new [`CookieAttributes`] with the given name and default attributes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::CookieAttributes;
    ///
    /// let attrs = CookieAttributes::new("name");
    /// assert_eq!(attrs.name(), "name");
    /// assert_eq!(attrs.value(), None);
    /// assert_eq!(attrs.expiry(), 0);
    /// assert_eq!(attrs.path(), Some("/"));
    /// assert_eq!(attrs.domain(), None);
    /// assert!(attrs.http_only());
    /// assert!(!attrs.secure_only());
    /// ```
    pub fn new<N: Into<String>>(name: N) -> Self {
        CookieAttributes {
            name: name.into(),
            value: None,
            expiry: 0,
            path: Some("/".to_string()),
            domain: None,
            http_only: true,
            secure_only: false,
        }
    }

    /// Returns the name of `self`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of `self`, if one was set.
    #[inline]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the absolute Unix timestamp at which the cookie expires.
    /// `0` stands for a session cookie.
    #[inline]
    pub fn expiry(&self) -> i64 {
        self.expiry
    }

    /// Returns the [`Expiration`] corresponding to [`CookieAttributes::expiry()`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::{CookieAttributes, Expiration};
    ///
    /// let attrs = CookieAttributes::new("name");
    /// assert_eq!(attrs.expiration(), Expiration::Session);
    ///
    /// let attrs = attrs.set_expiry(1_000);
    /// assert!(attrs.expiration().is_datetime());
    /// ```
    pub fn expiration(&self) -> Expiration {
        Expiration::from_timestamp(self.expiry)
    }

    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the `Domain` of `self`, if one was specified.
    ///
    /// A leading `.` is stripped.
    ///
    /// ```
    /// use amaretti::CookieAttributes;
    ///
    /// let c = CookieAttributes::new("name").set_domain(".crates.io");
    /// assert_eq!(c.domain(), Some("crates.io"));
    /// ```
    #[inline]
    pub fn domain(&self) -> Option<&str> {
        self.domain
            .as_deref()
            .map(|domain| domain.strip_prefix('.').unwrap_or(domain))
    }

    #[inline]
    pub fn http_only(&self) -> bool {
        self.http_only
    }

    #[inline]
    pub fn secure_only(&self) -> bool {
        self.secure_only
    }

    /// Checks that `self` can be sent in a `Set-Cookie` header.
    ///
    /// The name must be non-empty and must not contain ASCII control characters
    /// or any of `=`, `,`, `;`, `:`, space.
    /// The value, path and domain must not contain ASCII control characters or `;`,
    /// otherwise they would smuggle extra attributes (or headers) into the directive.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::CookieAttributes;
    ///
    /// assert!(CookieAttributes::new("session_id").validate().is_ok());
    /// assert!(CookieAttributes::new("bad name").validate().is_err());
    /// assert!(CookieAttributes::new("").validate().is_err());
    /// assert!(CookieAttributes::new("a").set_path("/; Domain=evil.com").validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), InvalidCookieError> {
        validate_name(&self.name)?;
        if let Some(value) = &self.value {
            validate_attribute("value", value)?;
        }
        if let Some(path) = &self.path {
            validate_attribute("path", path)?;
        }
        if let Some(domain) = &self.domain {
            validate_attribute("domain", domain)?;
        }
        Ok(())
    }

    /// Returns a [`Directive`] builder for `self`.
    pub fn directive(&self) -> Directive<'_> {
        Directive::new(self)
    }
}

/// Methods to set fields in [`CookieAttributes`].
impl CookieAttributes {
    pub fn set_name<N: Into<String>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the value of `self`.
    ///
    /// ```rust
    /// use amaretti::CookieAttributes;
    ///
    /// let c = CookieAttributes::new("name").set_value("value");
    /// assert_eq!(c.value(), Some("value"));
    ///
    /// let c = c.unset_value();
    /// assert_eq!(c.value(), None);
    /// ```
    pub fn set_value<V: Into<String>>(mut self, value: V) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn unset_value(mut self) -> Self {
        self.value = None;
        self
    }

    /// Sets the absolute Unix timestamp at which the cookie expires.
    /// Use `0` for a session cookie.
    #[inline]
    pub fn set_expiry(mut self, expiry: i64) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn set_path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Unsets the path of `self`: the `Path` attribute is omitted and the client
    /// falls back to the path of the request URL.
    pub fn unset_path(mut self) -> Self {
        self.path = None;
        self
    }

    pub fn set_domain<D: Into<String>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Unsets the domain of `self`, making it a host-only cookie.
    pub fn unset_domain(mut self) -> Self {
        self.domain = None;
        self
    }

    #[inline]
    pub fn set_http_only(mut self, value: bool) -> Self {
        self.http_only = value;
        self
    }

    #[inline]
    pub fn set_secure_only(mut self, value: bool) -> Self {
        self.secure_only = value;
        self
    }
}

/// Formats `self` as a `Set-Cookie` header value, using the current time to
/// compute `Max-Age`.
///
/// Nothing is validated: use [`Directive::build()`] if you need that.
impl fmt::Display for CookieAttributes {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.directive(), f)
    }
}

/// Characters a cookie name can never contain, on top of ASCII control characters.
const FORBIDDEN_NAME_CHARS: &[char] = &['=', ',', ';', ':', ' ', '\t', '\r', '\n', '\x0b', '\x0c'];

pub(crate) fn validate_name(name: &str) -> Result<(), InvalidNameError> {
    if name.is_empty() {
        return Err(InvalidNameError {
            name: name.to_string(),
            character: None,
        });
    }
    match name
        .chars()
        .find(|c| c.is_ascii_control() || FORBIDDEN_NAME_CHARS.contains(c))
    {
        Some(c) => Err(InvalidNameError {
            name: name.to_string(),
            character: Some(c),
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The name of a cookie is empty or contains a forbidden character.
pub struct InvalidNameError {
    name: String,
    character: Option<char>,
}

impl InvalidNameError {
    /// The rejected name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first forbidden character found in the name, `None` if the name is empty.
    pub fn character(&self) -> Option<char> {
        self.character
    }
}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.character {
            Some(c) => write!(
                f,
                "The cookie name `{}` contains a forbidden character: {:?}",
                self.name.escape_default(),
                c
            ),
            None => write!(f, "The name of a cookie cannot be empty"),
        }
    }
}

impl std::error::Error for InvalidNameError {}

pub(crate) fn validate_attribute(
    attribute: &'static str,
    value: &str,
) -> Result<(), InvalidAttributeError> {
    match value.chars().find(|c| c.is_ascii_control() || *c == ';') {
        Some(c) => Err(InvalidAttributeError {
            attribute,
            value: value.to_string(),
            character: c,
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The value, path or domain of a cookie contains a character that would
/// break out of its attribute.
pub struct InvalidAttributeError {
    attribute: &'static str,
    value: String,
    character: char,
}

impl InvalidAttributeError {
    /// Which attribute was rejected: `value`, `path` or `domain`.
    pub fn attribute(&self) -> &'static str {
        self.attribute
    }

    /// The rejected attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The first forbidden character found in the attribute.
    pub fn character(&self) -> char {
        self.character
    }
}

impl fmt::Display for InvalidAttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The cookie {} `{}` contains a forbidden character: {:?}",
            self.attribute,
            self.value.escape_default(),
            self.character
        )
    }
}

impl std::error::Error for InvalidAttributeError {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
/// The error returned by [`CookieAttributes::validate`].
pub enum InvalidCookieError {
    #[error(transparent)]
    Name(#[from] InvalidNameError),
    #[error(transparent)]
    Attribute(#[from] InvalidAttributeError),
}
