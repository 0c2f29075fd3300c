//! Configuration for a [`CookieStore`].
//!
//! Check out the [`StoreConfig`] struct for more information.
//!
//! [`CookieStore`]: crate::CookieStore

/// `StoreConfig` specifies the defaults a [`CookieStore`] applies to the
/// cookies it writes, and how cookie values travel on the wire.
///
/// ```rust
/// use amaretti::{CookieStore, RequestCookies, ResponseCookies, StoreConfig};
///
/// let mut config = StoreConfig::default();
/// config.secure = true;
/// config.default_domain = Some("example.com".to_string());
///
/// let store = CookieStore::with_config(RequestCookies::new(), ResponseCookies::new(), config);
/// assert!(store.config().secure);
/// ```
///
/// With the `serde` feature (on by default), it can be deserialized from your
/// application's configuration; missing fields take their default value.
///
/// [`CookieStore`]: crate::CookieStore
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// If `true`, cookie values are:
    ///
    /// - percent-decoded, when parsing request cookies out of the `Cookie` header.
    /// - percent-encoded, when building the `Set-Cookie` header.
    ///
    /// If `false`, cookie values are used as is.
    ///
    /// By default, this field is `true`.
    pub percent_encode: bool,
    /// The `Path` used when an operation doesn't specify one.
    ///
    /// By default, `/`.
    pub default_path: String,
    /// The `Domain` used when an operation doesn't specify one.
    ///
    /// By default, `None`: cookies are host-only.
    pub default_domain: Option<String>,
    /// Whether cookies written by the store are marked `HttpOnly`.
    ///
    /// By default, `true`.
    pub http_only: bool,
    /// Whether cookies written via [`CookieStore::set`] are marked `Secure`.
    ///
    /// By default, `false`.
    ///
    /// [`CookieStore::set`]: crate::CookieStore::set
    pub secure: bool,
    /// The base64 alphabet used to obscure values when `encrypt` is requested.
    pub alphabet: Base64Alphabet,
}

/// The base64 alphabets supported for the reversible value encoding.
///
/// Neither of them provides any confidentiality: the encoding only keeps
/// values opaque to a casual observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub enum Base64Alphabet {
    /// `A-Z a-z 0-9 + /` with `=` padding.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "standard"))]
    Standard,
    /// `A-Z a-z 0-9 - _` with `=` padding.
    #[cfg_attr(feature = "serde", serde(alias = "url_safe"))]
    UrlSafe,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            percent_encode: true,
            default_path: "/".to_string(),
            default_domain: None,
            http_only: true,
            secure: false,
            alphabet: Base64Alphabet::Standard,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::{Base64Alphabet, StoreConfig};

    #[test]
    fn missing_fields_take_their_default() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"alphabet":"url_safe","secure":true}"#).unwrap();
        assert_eq!(config.alphabet, Base64Alphabet::UrlSafe);
        assert!(config.secure);
        assert!(config.percent_encode);
        assert!(config.http_only);
        assert_eq!(config.default_path, "/");
        assert_eq!(config.default_domain, None);

        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn alphabets_accept_both_spellings() {
        for (raw, expected) in [
            (r#""standard""#, Base64Alphabet::Standard),
            (r#""Standard""#, Base64Alphabet::Standard),
            (r#""url_safe""#, Base64Alphabet::UrlSafe),
            (r#""UrlSafe""#, Base64Alphabet::UrlSafe),
        ] {
            assert_eq!(serde_json::from_str::<Base64Alphabet>(raw).unwrap(), expected);
        }
        assert!(serde_json::from_str::<Base64Alphabet>(r#""hex""#).is_err());
    }
}
