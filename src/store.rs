use time::OffsetDateTime;

use crate::{
    Cookie, CookieAttributes, CookieValue, Processor, RemovalCookie, RequestCookies,
    ResponseCookies, ResponseSink, StoreConfig,
};

/// Reads and writes the cookies of a single request.
///
/// A `CookieStore` is a per-request context object: it owns the request-side
/// view ([`RequestCookies`]) and the outbound boundary (a [`ResponseSink`],
/// [`ResponseCookies`] by default).
///
/// Every operation fails softly: writes return whether the `Set-Cookie`
/// directive was accepted by the sink, reads return `None` for missing or
/// unreadable cookies. Failures are logged via `tracing`.
///
/// # Example
///
/// ```rust
/// use amaretti::{CookieStore, RequestCookies, ResponseCookies};
///
/// let mut store = CookieStore::new(RequestCookies::new(), ResponseCookies::new());
///
/// assert!(store.set("test", "new_test", 10, None, true));
/// assert_eq!(store.get("test", true).unwrap(), "new_test");
/// assert!(store.has("test", None, true));
/// assert!(store.has("test", Some("new_test"), true));
///
/// // The value travels base64-encoded (and percent-encoded).
/// let directive = store.response().last_for("test").unwrap();
/// assert!(directive.starts_with("test=bmV3X3Rlc3Q%3D; Expires="));
/// ```
///
/// # Reversible encoding
///
/// The `encrypt`/`decrypt` flags apply base64 to the value. This keeps values
/// opaque to a casual observer but offers **no** confidentiality or integrity:
/// never store secrets this way.
#[derive(Debug, Clone)]
pub struct CookieStore<S = ResponseCookies> {
    request: RequestCookies,
    response: S,
    processor: Processor,
    config: StoreConfig,
    fixed_now: Option<OffsetDateTime>,
}

impl<S: ResponseSink> CookieStore<S> {
    /// Creates a store with the default [`StoreConfig`].
    pub fn new(request: RequestCookies, response: S) -> Self {
        Self::with_config(request, response, StoreConfig::default())
    }

    pub fn with_config(request: RequestCookies, response: S, config: StoreConfig) -> Self {
        CookieStore {
            request,
            response,
            processor: Processor::from(&config),
            config,
            fixed_now: None,
        }
    }

    /// Uses `now` as the current time, instead of the system clock, to compute
    /// expiry timestamps and `Max-Age`.
    pub fn fixed_time(mut self, now: OffsetDateTime) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn now(&self) -> OffsetDateTime {
        self.fixed_now.unwrap_or_else(OffsetDateTime::now_utc)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// The request-side view.
    pub fn request(&self) -> &RequestCookies {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut RequestCookies {
        &mut self.request
    }

    pub fn response(&self) -> &S {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut S {
        &mut self.response
    }

    /// Consumes the store, returning the request-side view and the sink.
    pub fn into_parts(self) -> (RequestCookies, S) {
        (self.request, self.response)
    }

    /// Returns a [`Cookie`] wrapper for `name`, bound to this store.
    pub fn cookie<N: Into<String>>(&mut self, name: N) -> Cookie<'_, S> {
        Cookie::new(self, name)
    }

    /// Sends the directive for `attributes` to the sink, as is.
    ///
    /// Returns `false` if the cookie is invalid or if the sink rejected the directive.
    pub fn emit(&mut self, attributes: &CookieAttributes) -> bool {
        let now = self.now();
        self.emit_at(attributes, now)
    }

    fn emit_at(&mut self, attributes: &CookieAttributes, now: OffsetDateTime) -> bool {
        // Validated after processing: percent-encoding makes any value safe.
        let outgoing = self.processor.process_outgoing(attributes.clone());
        if let Err(e) = outgoing.validate() {
            tracing::warn!(error = %e, "Refusing to emit a `Set-Cookie` header");
            return false;
        }
        let directive = outgoing.directive().at(now).to_string();
        let accepted = self.response.queue_set_cookie(directive);
        if accepted {
            tracing::debug!(cookie = attributes.name(), "Queued a `Set-Cookie` header");
        } else {
            tracing::warn!(
                cookie = attributes.name(),
                "The `Set-Cookie` header was rejected by the response"
            );
        }
        accepted
    }

    /// Writes a cookie with an absolute expiry timestamp, without any value
    /// encoding.
    ///
    /// `path` and `domain` fall back to the configured defaults; `HttpOnly`
    /// comes from the configuration.
    ///
    /// ```rust
    /// use amaretti::{CookieStore, RequestCookies, ResponseCookies};
    ///
    /// let mut store = CookieStore::new(RequestCookies::new(), ResponseCookies::new());
    /// assert!(store.set_raw("a", Some("b"), 0, None, None, false));
    /// assert_eq!(store.response().last_for("a"), Some("a=b; Path=/; HttpOnly"));
    ///
    /// // Invalid names are never sent.
    /// assert!(!store.set_raw("a b", Some("c"), 0, None, None, false));
    /// ```
    pub fn set_raw(
        &mut self,
        name: &str,
        value: Option<&str>,
        expires_at: i64,
        path: Option<&str>,
        domain: Option<&str>,
        secure: bool,
    ) -> bool {
        let attributes = self.raw_attributes(name, value, expires_at, path, domain, secure);
        self.emit(&attributes)
    }

    fn raw_attributes(
        &self,
        name: &str,
        value: Option<&str>,
        expires_at: i64,
        path: Option<&str>,
        domain: Option<&str>,
        secure: bool,
    ) -> CookieAttributes {
        let mut attributes = CookieAttributes::new(name)
            .set_expiry(expires_at)
            .set_path(path.unwrap_or(&self.config.default_path))
            .set_http_only(self.config.http_only)
            .set_secure_only(secure);
        attributes.value = value.map(str::to_owned);
        attributes.domain = domain
            .map(str::to_owned)
            .or_else(|| self.config.default_domain.clone());
        attributes
    }

    /// Writes a cookie expiring `minutes` from now.
    ///
    /// Structured values are serialized to JSON; if `encrypt` is set the text
    /// is then base64-encoded. On success, the stored value is mirrored into
    /// the request-side view so that it can be read back within this request.
    pub fn set<V: Into<CookieValue>>(
        &mut self,
        name: &str,
        value: V,
        minutes: i64,
        path: Option<&str>,
        encrypt: bool,
    ) -> bool {
        let stored = self.processor.encode_value(&value.into(), encrypt);
        let now = self.now();
        let expires_at = now
            .unix_timestamp()
            .saturating_add(minutes.saturating_mul(60));
        let secure = self.config.secure;
        let attributes =
            self.raw_attributes(name, Some(stored.as_str()), expires_at, path, None, secure);
        let accepted = self.emit_at(&attributes, now);
        if accepted {
            self.request.insert(name, stored);
        }
        accepted
    }

    /// Reads a cookie from the request-side view.
    ///
    /// Returns `None` if the cookie is missing or empty, or if `decrypt` is set
    /// and the value isn't valid base64-encoded UTF-8.
    /// Values that decode to a JSON object are returned as
    /// [`CookieValue::Structured`].
    pub fn get(&self, name: &str, decrypt: bool) -> Option<CookieValue> {
        let stored = self.request.get(name).filter(|v| !v.is_empty())?;
        match self.processor.decode_value(stored, decrypt) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(cookie = name, error = %e, "Failed to decode a request cookie");
                None
            }
        }
    }

    /// Checks a cookie in the request-side view.
    ///
    /// Without an expected value, returns `true` if the cookie is present and
    /// non-empty. Otherwise, returns `true` if the stored value is exactly the
    /// expected one, base64-encoded first if `encrypt` is set.
    ///
    /// An empty cookie is never present, and an empty expected value is the
    /// same as no expected value.
    pub fn has(&self, name: &str, expected: Option<&str>, encrypt: bool) -> bool {
        let Some(stored) = self.request.get(name) else {
            return false;
        };
        match expected.filter(|e| !e.is_empty()) {
            None => !stored.is_empty(),
            Some(expected) if encrypt => stored == self.processor.obscure(expected),
            Some(expected) => stored == expected,
        }
    }

    /// Writes a cookie only if it isn't already present.
    ///
    /// - Missing: behaves like [`CookieStore::set`] with `encrypt` on, returning `Some(_)`.
    /// - Present and `remove_if_present`: destroys the cookie, returning `Some(_)`.
    /// - Present otherwise: does nothing and returns `None`.
    ///
    /// ```rust
    /// use amaretti::{CookieStore, RequestCookies, ResponseCookies};
    ///
    /// let mut store = CookieStore::new(RequestCookies::new(), ResponseCookies::new());
    /// assert_eq!(store.set_doesnt_have("visit", "first", 5, None, false), Some(true));
    /// assert_eq!(store.set_doesnt_have("visit", "second", 5, None, false), None);
    /// assert_eq!(store.get("visit", true).unwrap(), "first");
    /// ```
    pub fn set_doesnt_have<V: Into<CookieValue>>(
        &mut self,
        name: &str,
        value: V,
        minutes: i64,
        path: Option<&str>,
        remove_if_present: bool,
    ) -> Option<bool> {
        if !self.has(name, None, true) {
            return Some(self.set(name, value, minutes, path, true));
        }
        if remove_if_present {
            return Some(self.destroy(name, path));
        }
        tracing::debug!(cookie = name, "Cookie already present, nothing to write");
        None
    }

    /// Instructs the client to remove a cookie.
    ///
    /// There is no value parameter: the removal directive always carries an
    /// empty value, expires in the past and has `Max-Age=0`. `path` falls back to
    /// the configured default and must match the one the cookie was set with.
    ///
    /// The request-side view is left untouched: the cookie stays readable until
    /// the next request. Use [`CookieStore::destroy_and_unset`] to drop it
    /// from the view as well.
    pub fn destroy(&mut self, name: &str, path: Option<&str>) -> bool {
        let mut removal = RemovalCookie::new(name)
            .set_path(path.unwrap_or(&self.config.default_path));
        if let Some(domain) = &self.config.default_domain {
            removal = removal.set_domain(domain.as_str());
        }
        let attributes = CookieAttributes::from(removal).set_http_only(self.config.http_only);
        self.emit(&attributes)
    }

    /// Removes a cookie from the request-side view, then instructs the client
    /// to remove it.
    pub fn destroy_and_unset(&mut self, name: &str, path: Option<&str>) -> bool {
        self.unset(name);
        self.destroy(name, path)
    }

    /// Removes a cookie from the request-side view, without sending anything
    /// to the client.
    pub fn unset(&mut self, name: &str) {
        if self.request.remove(name).is_some() {
            tracing::debug!(cookie = name, "Removed cookie from the request-side view");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        CookieStore, CookieValue, RequestCookies, ResponseCookies, ResponseSink, StoreConfig,
    };
    use serde_json::{json, Map};
    use time::macros::datetime;
    use time::OffsetDateTime;

    const NOW: OffsetDateTime = datetime!(2024-03-10 12:00:00 UTC);

    fn store() -> CookieStore {
        CookieStore::new(RequestCookies::new(), ResponseCookies::new()).fixed_time(NOW)
    }

    fn user() -> Map<String, serde_json::Value> {
        let mut user = Map::new();
        user.insert("name".into(), json!("Rafael"));
        user.insert("role".into(), json!("Developer"));
        user
    }

    #[test]
    fn set_emits_an_expiring_encoded_directive() {
        let mut store = store();
        assert!(store.set("test", "new_test", 10, None, true));
        assert_eq!(
            store.response().last_for("test"),
            Some("test=bmV3X3Rlc3Q%3D; Expires=Sun, 10-Mar-2024 12:10:00 GMT; Max-Age=600; Path=/; HttpOnly")
        );
        assert_eq!(store.request().get("test"), Some("bmV3X3Rlc3Q="));
    }

    #[test]
    fn set_then_get_roundtrips_scalars() {
        let mut store = store();
        for encrypt in [true, false] {
            assert!(store.set("scalar", "a value/with ünicode", 10, None, encrypt));
            assert_eq!(
                store.get("scalar", encrypt),
                Some(CookieValue::from("a value/with ünicode"))
            );
        }
    }

    #[test]
    fn set_then_get_roundtrips_structured_values() {
        let mut store = store();
        assert!(store.set("user", user(), 10, None, true));
        let value = store.get("user", true).unwrap();
        assert_eq!(value, CookieValue::Structured(user()));
        assert_eq!(value.get("role"), Some(&json!("Developer")));

        assert!(store.set("plain_user", user(), 10, Some("/app"), false));
        assert_eq!(
            store.request().get("plain_user"),
            Some(r#"{"name":"Rafael","role":"Developer"}"#)
        );
        assert_eq!(store.get("plain_user", false), Some(CookieValue::Structured(user())));
    }

    #[test]
    fn get_missing_or_empty_is_none() {
        let mut store = store();
        assert_eq!(store.get("missing", true), None);

        store.request_mut().insert("empty", "");
        assert_eq!(store.get("empty", false), None);
        assert!(!store.has("empty", None, false));

        store.request_mut().insert("zero", "0");
        assert_eq!(store.get("zero", false).unwrap(), "0");
        assert!(store.has("zero", None, false));
    }

    #[test]
    fn get_undecodable_is_none() {
        let mut store = store();
        store.request_mut().insert("legacy", "not base64!");
        assert_eq!(store.get("legacy", true), None);
        assert_eq!(store.get("legacy", false).unwrap(), "not base64!");
    }

    #[test]
    fn has_compares_encoded_values() {
        let mut store = store();
        store.set("test", "new_test", 10, None, true);
        assert!(store.has("test", Some("new_test"), true));
        assert!(!store.has("test", Some("new_test"), false));
        assert!(store.has("test", Some("bmV3X3Rlc3Q="), false));
        assert!(!store.has("test", Some("other"), true));
        assert!(!store.has("missing", Some("new_test"), true));
    }

    #[test]
    fn empty_values_are_never_present() {
        let mut store = store();
        store.request_mut().insert("a", "");
        for encrypt in [true, false] {
            assert!(!store.has("a", Some(""), encrypt));
            assert!(!store.has("a", None, encrypt));
        }
        assert_eq!(store.get("a", true), None);

        store.request_mut().insert("b", "x");
        assert!(store.has("b", Some(""), false));
    }

    #[test]
    fn injected_attributes_are_rejected() {
        let mut store = store();
        assert!(!store.set("a", "b", 10, Some("/\r\nX-Evil: 1; Domain=evil.com"), false));
        assert!(!store.set_raw("a", Some("b"), 0, Some("/"), Some("evil.com; Secure"), false));
        assert!(!store.destroy("a", Some("/;")));
        assert!(store.response().is_empty());
        assert!(!store.has("a", None, false));

        // Percent-encoding neutralizes separators in values.
        assert!(store.set("a", "b; Domain=evil.com", 10, None, false));
        assert!(store
            .response()
            .last_for("a")
            .unwrap()
            .starts_with("a=b%3B%20Domain%3Devil.com; "));
    }

    #[test]
    fn raw_values_are_checked_without_percent_encoding() {
        let mut config = StoreConfig::default();
        config.percent_encode = false;
        let mut store =
            CookieStore::with_config(RequestCookies::new(), ResponseCookies::new(), config)
                .fixed_time(NOW);
        assert!(!store.set("a", "b; Domain=evil.com", 10, None, false));
        assert!(!store.set_raw("a", Some("b\r\nX-Evil: 1"), 0, None, None, false));
        assert!(store.response().is_empty());
    }

    #[test]
    fn max_age_matches_the_expiry_on_the_system_clock() {
        let mut store = CookieStore::new(RequestCookies::new(), ResponseCookies::new());
        assert!(store.set("a", "b", 10, None, false));
        assert!(store.response().last_for("a").unwrap().contains("; Max-Age=600; "));
    }

    #[test]
    fn destroy_keeps_the_request_side_view() {
        let mut store = store();
        store.set("test", "new_test", 10, None, true);

        assert!(store.destroy("test", None));
        assert_eq!(
            store.response().last_for("test"),
            Some("test=; Expires=Wed, 31-Dec-1969 23:59:59 GMT; Max-Age=0; Path=/; HttpOnly")
        );
        assert!(store.has("test", None, true));
    }

    #[test]
    fn destroy_and_unset_clears_the_request_side_view() {
        let mut store = store();
        store.set("test", "new_test", 10, None, true);

        assert!(store.destroy_and_unset("test", Some("/app")));
        assert!(!store.has("test", None, true));
        assert_eq!(store.get("test", true), None);
        assert_eq!(
            store.response().last_for("test"),
            Some("test=; Expires=Wed, 31-Dec-1969 23:59:59 GMT; Max-Age=0; Path=/app; HttpOnly")
        );
    }

    #[test]
    fn unset_sends_nothing() {
        let mut store = store();
        store.request_mut().insert("a", "b");
        store.unset("a");
        assert!(!store.has("a", None, false));
        assert!(store.response().is_empty());
    }

    #[test]
    fn set_doesnt_have_twice_writes_once() {
        let mut store = store();
        assert_eq!(store.set_doesnt_have("a", "first", 5, None, false), Some(true));
        assert_eq!(store.set_doesnt_have("a", "second", 5, None, false), None);
        assert_eq!(store.response().len(), 1);
        assert_eq!(store.get("a", true).unwrap(), "first");
    }

    #[test]
    fn set_doesnt_have_can_remove() {
        let mut store = store();
        store.set("a", "first", 5, None, true);
        assert_eq!(store.set_doesnt_have("a", "second", 5, None, true), Some(true));
        assert_eq!(
            store.response().last_for("a"),
            Some("a=; Expires=Wed, 31-Dec-1969 23:59:59 GMT; Max-Age=0; Path=/; HttpOnly")
        );
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut store = store();
        for name in ["", "a b", "a=b", "a;b", "a\r\nSet-Cookie: x"] {
            assert!(!store.set(name, "value", 5, None, true), "{name:?}");
            assert!(!store.destroy(name, None));
        }
        assert!(store.response().is_empty());
        assert!(store.request().is_empty());
    }

    #[test]
    fn rejected_directives_are_not_mirrored() {
        let mut store = store();
        store.response_mut().mark_sent();
        assert!(!store.set("a", "b", 5, None, true));
        assert!(!store.has("a", None, true));
        assert_eq!(store.set_doesnt_have("a", "b", 5, None, false), Some(false));
    }

    #[test]
    fn configuration_is_applied() {
        let mut config = StoreConfig::default();
        config.default_path = "/app".to_string();
        config.default_domain = Some("example.com".to_string());
        config.secure = true;
        config.http_only = false;
        config.percent_encode = false;

        let mut store =
            CookieStore::with_config(RequestCookies::new(), Vec::<String>::new(), config)
                .fixed_time(NOW);
        assert!(store.set("a", "x y", 0, None, false));
        assert!(store.destroy("a", None));

        let (request, headers) = store.into_parts();
        assert_eq!(request.get("a"), Some("x y"));
        assert_eq!(
            headers,
            [
                "a=x y; Expires=Sun, 10-Mar-2024 12:00:00 GMT; Max-Age=0; Path=/app; Domain=example.com; Secure",
                "a=; Expires=Wed, 31-Dec-1969 23:59:59 GMT; Max-Age=0; Path=/app; Domain=example.com",
            ]
        );
    }

    #[test]
    fn custom_sinks_can_reject() {
        struct Closed;

        impl ResponseSink for Closed {
            fn queue_set_cookie(&mut self, _directive: String) -> bool {
                false
            }
        }

        let mut store = CookieStore::new(RequestCookies::new(), Closed);
        assert!(!store.set_raw("a", Some("b"), 0, None, None, false));
        assert!(!store.destroy_and_unset("a", None));
    }
}
