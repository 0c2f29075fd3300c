use crate::CookieAttributes;

/// The expiry of a removal directive: one second before the Unix epoch.
pub(crate) const REMOVAL_EXPIRY: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A cookie that, when sent to the client, removes the cookie with the same
/// name, path and domain from the client's machine, if it exists.
///
/// It converts into [`CookieAttributes`] with an empty value and an expiry in
/// the past.
///
/// ```rust
/// use amaretti::{CookieAttributes, RemovalCookie};
///
/// let attrs: CookieAttributes = RemovalCookie::new("name").set_path("/admin").into();
/// assert_eq!(attrs.value(), Some(""));
/// assert_eq!(attrs.expiry(), -1);
/// assert_eq!(attrs.path(), Some("/admin"));
/// ```
pub struct RemovalCookie {
    /// The cookie's name.
    pub(crate) name: String,
    /// The cookie's domain, if any.
    pub(crate) domain: Option<String>,
    /// The cookie's path, if any.
    pub(crate) path: Option<String>,
}

impl RemovalCookie {
    /// Creates a new [`RemovalCookie`] with the given name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::RemovalCookie;
    ///
    /// let removal = RemovalCookie::new("name")
    ///     .set_path("/");
    /// assert_eq!(removal.name(), "name");
    /// assert_eq!(removal.path(), Some("/"));
    /// assert_eq!(removal.domain(), None);
    /// ```
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            domain: None,
            path: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[inline]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Sets the path property of the removal cookie to `path`.
    ///
    /// A client only removes a cookie if path and domain match the ones it was set with.
    pub fn set_path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn set_domain<D: Into<String>>(mut self, domain: D) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

impl From<RemovalCookie> for CookieAttributes {
    fn from(value: RemovalCookie) -> Self {
        let mut c = CookieAttributes::new(value.name)
            .set_value("")
            // A date in the past to ensure the client removes the cookie.
            .set_expiry(REMOVAL_EXPIRY);
        c.path = value.path;
        c.domain = value.domain;
        c
    }
}

impl From<&CookieAttributes> for RemovalCookie {
    fn from(value: &CookieAttributes) -> Self {
        RemovalCookie {
            name: value.name.clone(),
            domain: value.domain.clone(),
            path: value.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{CookieAttributes, RemovalCookie};
    use time::macros::datetime;

    #[test]
    fn removal_directive() {
        let now = datetime!(2024-05-01 12:00:00 UTC);
        let attrs: CookieAttributes = RemovalCookie::new("a").set_path("/").into();
        let directive = attrs.directive().at(now).to_string();
        assert_eq!(
            directive,
            "a=; Expires=Wed, 31-Dec-1969 23:59:59 GMT; Max-Age=0; Path=/; HttpOnly"
        );
    }

    #[test]
    fn removal_keeps_path_and_domain_of_the_original() {
        let original = CookieAttributes::new("a")
            .set_value("b")
            .set_path("/admin")
            .set_domain("example.com")
            .set_expiry(2_000_000_000);
        let attrs: CookieAttributes = RemovalCookie::from(&original).into();
        assert_eq!(attrs.name(), "a");
        assert_eq!(attrs.value(), Some(""));
        assert_eq!(attrs.path(), Some("/admin"));
        assert_eq!(attrs.domain(), Some("example.com"));
        assert_eq!(attrs.expiry(), -1);
    }

    #[test]
    fn removal_without_path_omits_it() {
        let attrs: CookieAttributes = RemovalCookie::new("a").into();
        assert_eq!(attrs.path(), None);
    }
}
