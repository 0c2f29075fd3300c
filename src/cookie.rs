use crate::{CookieAttributes, CookieStore, RemovalCookie, ResponseCookies, ResponseSink};

/// A single cookie, bound to the [`CookieStore`] of the current request.
///
/// `Cookie` wraps [`CookieAttributes`]: configure it with the `set_*`
/// methods, then persist it. Values are written as is: no JSON, no base64.
///
/// ```rust
/// use amaretti::{CookieStore, RequestCookies, ResponseCookies};
///
/// let mut store = CookieStore::new(RequestCookies::new(), ResponseCookies::new());
///
/// let saved = store
///     .cookie("theme")
///     .set_value("dark")
///     .set_secure_only(true)
///     .save_and_set();
/// assert!(saved);
/// assert_eq!(store.request().get("theme"), Some("dark"));
/// assert_eq!(
///     store.response().last_for("theme"),
///     Some("theme=dark; Path=/; Secure; HttpOnly")
/// );
/// ```
#[derive(Debug)]
pub struct Cookie<'s, S = ResponseCookies> {
    attributes: CookieAttributes,
    store: &'s mut CookieStore<S>,
}

impl<'s, S: ResponseSink> Cookie<'s, S> {
    /// Prepares a new cookie called `name`, with the defaults of
    /// [`CookieAttributes::new()`].
    pub fn new<N: Into<String>>(store: &'s mut CookieStore<S>, name: N) -> Self {
        Cookie {
            attributes: CookieAttributes::new(name),
            store,
        }
    }

    /// Wraps existing attributes.
    pub fn from_attributes(store: &'s mut CookieStore<S>, attributes: CookieAttributes) -> Self {
        Cookie { attributes, store }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.attributes.name()
    }

    #[inline]
    pub fn value(&self) -> Option<&str> {
        self.attributes.value()
    }

    /// The Unix timestamp at which the cookie expires, `0` for a session cookie.
    #[inline]
    pub fn expiry_time(&self) -> i64 {
        self.attributes.expiry()
    }

    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.attributes.path()
    }

    #[inline]
    pub fn domain(&self) -> Option<&str> {
        self.attributes.domain()
    }

    #[inline]
    pub fn is_http_only(&self) -> bool {
        self.attributes.http_only()
    }

    #[inline]
    pub fn is_secure_only(&self) -> bool {
        self.attributes.secure_only()
    }

    pub fn attributes(&self) -> &CookieAttributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> CookieAttributes {
        self.attributes
    }

    pub fn set_value<V: Into<String>>(mut self, value: V) -> Self {
        self.attributes = self.attributes.set_value(value);
        self
    }

    pub fn unset_value(mut self) -> Self {
        self.attributes = self.attributes.unset_value();
        self
    }

    /// Sets the absolute Unix timestamp at which the cookie expires, usually
    /// `now + seconds`. Use `0` for a session cookie.
    pub fn set_expiry_time(mut self, expiry_time: i64) -> Self {
        self.attributes = self.attributes.set_expiry(expiry_time);
        self
    }

    pub fn set_path<P: Into<String>>(mut self, path: P) -> Self {
        self.attributes = self.attributes.set_path(path);
        self
    }

    pub fn unset_path(mut self) -> Self {
        self.attributes = self.attributes.unset_path();
        self
    }

    /// Sets the domain the cookie is valid for, subdomains included.
    pub fn set_domain<D: Into<String>>(mut self, domain: D) -> Self {
        self.attributes = self.attributes.set_domain(domain);
        self
    }

    /// Makes the cookie valid for the current host only.
    pub fn unset_domain(mut self) -> Self {
        self.attributes = self.attributes.unset_domain();
        self
    }

    pub fn set_http_only(mut self, http_only: bool) -> Self {
        self.attributes = self.attributes.set_http_only(http_only);
        self
    }

    pub fn set_secure_only(mut self, secure_only: bool) -> Self {
        self.attributes = self.attributes.set_secure_only(secure_only);
        self
    }

    /// Sends the cookie to the client.
    ///
    /// Returns whether the `Set-Cookie` header was accepted for sending.
    pub fn save(&mut self) -> bool {
        self.store.emit(&self.attributes)
    }

    /// Writes the value into the request-side view, then sends the cookie to
    /// the client.
    pub fn save_and_set(&mut self) -> bool {
        let name = self.attributes.name.clone();
        match self.attributes.value.clone() {
            Some(value) => {
                self.store.request_mut().insert(name, value);
            }
            None => self.store.unset(&name),
        }
        self.save()
    }

    /// Clears the value and instructs the client to remove the cookie.
    ///
    /// The request-side view is left untouched, see [`Cookie::delete_and_unset`].
    pub fn delete(&mut self) -> bool {
        let removal: CookieAttributes = RemovalCookie::from(&self.attributes).into();
        self.attributes = removal
            .set_http_only(self.attributes.http_only)
            .set_secure_only(self.attributes.secure_only);
        self.save()
    }

    /// Removes the cookie from the request-side view, then instructs the
    /// client to remove it.
    ///
    /// Without this, the cookie would only disappear from the view at the
    /// next request.
    pub fn delete_and_unset(&mut self) -> bool {
        self.store.unset(self.attributes.name());
        self.delete()
    }

    /// Checks whether the cookie is in the request-side view, with the same
    /// value if one is set.
    pub fn has_cookie(&self) -> bool {
        let expected = self.attributes.value().filter(|v| !v.is_empty());
        self.store.has(self.attributes.name(), expected, false)
    }
}
