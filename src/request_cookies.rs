use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::errors::DecodingError;
use crate::Processor;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// The request-side view: the cookies the server sees for the current request.
///
/// It can be built from the `Cookie` header(s) of the incoming request, or
/// from a map of already-decoded values handed over by your HTTP framework.
/// A [`CookieStore`] mirrors into this view the values it writes, so that
/// reads later in the same request see them.
///
/// ```rust
/// use amaretti::RequestCookies;
///
/// let cookies = RequestCookies::from_iter([("theme", "dark"), ("lang", "en")]);
/// assert_eq!(cookies.get("theme"), Some("dark"));
/// assert_eq!(cookies.get("missing"), None);
/// ```
///
/// [`CookieStore`]: crate::CookieStore
pub struct RequestCookies {
    cookies: HashMap<String, String>,
}

impl RequestCookies {
    /// Creates a new, empty [`RequestCookies`] map.
    pub fn new() -> RequestCookies {
        Default::default()
    }

    /// Inserts a cookie into `self`, replacing the existing value for the same name.
    ///
    /// # Return value
    ///
    /// Returns the previous value for that name, if any.
    ///
    /// # Example
    ///
    /// ```rust
    /// use amaretti::RequestCookies;
    ///
    /// let mut cookies = RequestCookies::new();
    /// assert_eq!(cookies.insert("name", "value1"), None);
    /// assert_eq!(cookies.insert("name", "value2").as_deref(), Some("value1"));
    /// assert_eq!(cookies.get("name"), Some("value2"));
    /// ```
    pub fn insert<N, V>(&mut self, name: N, value: V) -> Option<String>
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.cookies.insert(name.into(), value.into())
    }

    /// Get the value of a cookie by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns `true` if a cookie with the given name is in the view,
    /// whatever its value.
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Removes a cookie from the view, returning its value.
    ///
    /// ```rust
    /// use amaretti::RequestCookies;
    ///
    /// let mut cookies = RequestCookies::from_iter([("name", "value")]);
    /// assert_eq!(cookies.remove("name").as_deref(), Some("value"));
    /// assert!(!cookies.contains("name"));
    /// ```
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.cookies.remove(name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Iterates over all `(name, value)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Parse a `Cookie` header value into a [`RequestCookies`] map.
    ///
    /// ```rust
    /// use amaretti::{Processor, RequestCookies, StoreConfig};
    ///
    /// let processor = Processor::from(StoreConfig::default());
    /// let cookies = RequestCookies::parse_header(
    ///     "name=first%20value; name2=val; name=another%20value",
    ///     &processor,
    /// ).unwrap();
    ///
    /// // When a name is repeated, the first value wins.
    /// assert_eq!(cookies.get("name"), Some("first value"));
    /// assert_eq!(cookies.get("name2"), Some("val"));
    /// ```
    pub fn parse_header(header: &str, processor: &Processor) -> Result<RequestCookies, ParseError> {
        Self::parse_headers(std::iter::once(header), processor)
    }

    /// Parse a `Cookie` header value and add its cookies to the existing
    /// [`RequestCookies`] map.
    ///
    /// Cookies whose name is already in the map are ignored.
    pub fn extend_from_header(
        &mut self,
        header: &str,
        processor: &Processor,
    ) -> Result<(), ParseError> {
        for cookie in header.split(';') {
            if cookie.chars().all(char::is_whitespace) {
                continue;
            }

            let (name, value) = match cookie.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => {
                    let e = MissingPairError {
                        fragment: cookie.to_string(),
                    };
                    return Err(ParseError::MissingPair(e));
                }
            };

            if name.is_empty() {
                let e = EmptyNameError {
                    value: value.to_string(),
                };
                return Err(ParseError::EmptyName(e));
            }

            let (name, value) = processor
                .process_incoming(name, value)
                .map_err(ParseError::Decoding)?;

            if let Entry::Vacant(entry) = self.cookies.entry(name) {
                entry.insert(value);
            }
        }
        Ok(())
    }

    /// Parse multiple `Cookie` header values into a [`RequestCookies`] map.
    pub fn parse_headers<'h, I>(
        headers: I,
        processor: &Processor,
    ) -> Result<RequestCookies, ParseError>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let mut cookies = RequestCookies::new();
        for header in headers {
            cookies.extend_from_header(header, processor)?;
        }
        Ok(cookies)
    }
}

impl<N, V> FromIterator<(N, V)> for RequestCookies
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        RequestCookies {
            cookies: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for RequestCookies {
    fn from(cookies: HashMap<String, String>) -> Self {
        RequestCookies { cookies }
    }
}

#[derive(Debug)]
#[non_exhaustive]
/// The error returned by [`RequestCookies::parse_header()`].
pub enum ParseError {
    MissingPair(MissingPairError),
    EmptyName(EmptyNameError),
    Decoding(DecodingError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse cookies out of a header value")
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::MissingPair(e) => Some(e),
            ParseError::EmptyName(e) => Some(e),
            ParseError::Decoding(e) => Some(e),
        }
    }
}

#[derive(Debug)]
/// An error that occurs when parsing a fragment of a `Cookie` header value
/// that doesn't contain a name-value separator (`=`).
pub struct MissingPairError {
    fragment: String,
}

impl std::fmt::Display for MissingPairError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Expected a name-value pair, but no `=` was found in `{}`",
            self.fragment
        )
    }
}

impl std::error::Error for MissingPairError {}

#[derive(Debug)]
/// An error that occurs when parsing a fragment of a `Cookie` header value
/// that contains an empty name (e.g. `=value`).
pub struct EmptyNameError {
    value: String,
}

impl std::fmt::Display for EmptyNameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "The name of a cookie cannot be empty, but found an empty name with `{}` as value",
            self.value
        )
    }
}

impl std::error::Error for EmptyNameError {}
