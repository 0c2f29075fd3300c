use crate::config::Base64Alphabet;
use crate::encoding::encode;
use crate::{CookieAttributes, CookieValue, StoreConfig};
use anyhow::Context;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use percent_encoding::percent_decode;

/// Transforms cookie values before they are sent to the client, or after they
/// have been parsed from an incoming request.
///
/// It owns the two encodings a value can go through:
///
/// - percent-encoding, applied to every value on the wire (if enabled);
/// - the reversible base64 encoding that [`CookieStore::set`] applies when
///   asked to "encrypt" a value.
///
/// The latter is **not** encryption: anybody can decode the value.
///
/// ```rust
/// use amaretti::{CookieValue, Processor, StoreConfig};
///
/// let processor = Processor::from(StoreConfig::default());
/// let stored = processor.encode_value(&CookieValue::from("new_test"), true);
/// assert_eq!(stored, "bmV3X3Rlc3Q=");
/// assert_eq!(processor.decode_value(&stored, true).unwrap(), "new_test");
/// ```
///
/// [`CookieStore::set`]: crate::CookieStore::set
#[derive(Debug, Clone)]
pub struct Processor {
    percent_encode: bool,
    alphabet: Base64Alphabet,
}

impl From<StoreConfig> for Processor {
    fn from(value: StoreConfig) -> Self {
        Processor::from(&value)
    }
}

impl From<&StoreConfig> for Processor {
    fn from(value: &StoreConfig) -> Self {
        Processor {
            percent_encode: value.percent_encode,
            alphabet: value.alphabet,
        }
    }
}

impl Processor {
    /// Applies the reversible base64 encoding to `text`.
    pub fn obscure(&self, text: &str) -> String {
        match self.alphabet {
            Base64Alphabet::Standard => STANDARD.encode(text.as_bytes()),
            Base64Alphabet::UrlSafe => URL_SAFE.encode(text.as_bytes()),
        }
    }

    /// Reverses [`Processor::obscure`].
    pub fn reveal(&self, encoded: &str) -> Result<String, ValueDecodingError> {
        let bytes = match self.alphabet {
            Base64Alphabet::Standard => STANDARD.decode(encoded.as_bytes())?,
            Base64Alphabet::UrlSafe => URL_SAFE.decode(encoded.as_bytes())?,
        };
        Ok(String::from_utf8(bytes)?)
    }

    /// Turns a [`CookieValue`] into the string stored in the cookie:
    /// structured values are serialized to JSON, then the text is obscured if
    /// `encrypt` is set.
    pub fn encode_value(&self, value: &CookieValue, encrypt: bool) -> String {
        let text = value.to_text();
        if encrypt {
            self.obscure(&text)
        } else {
            text
        }
    }

    /// Reverses [`Processor::encode_value`].
    ///
    /// The text is revealed if `decrypt` is set; it is then returned as a
    /// `Structured` value if it parses as a JSON object, verbatim otherwise.
    pub fn decode_value(
        &self,
        stored: &str,
        decrypt: bool,
    ) -> Result<CookieValue, ValueDecodingError> {
        let text = if decrypt {
            self.reveal(stored)?
        } else {
            stored.to_string()
        };
        Ok(CookieValue::from_text(text))
    }

    /// Transform [`CookieAttributes`] before their directive is sent to the client.
    pub fn process_outgoing(&self, mut cookie: CookieAttributes) -> CookieAttributes {
        if self.percent_encode {
            if let Some(value) = cookie.value.take() {
                cookie.value = Some(encode(&value).to_string());
            }
        }
        cookie
    }

    /// Transform a name/value pair parsed out of a `Cookie` header before it
    /// is added to [`RequestCookies`].
    ///
    /// [`RequestCookies`]: crate::RequestCookies
    pub fn process_incoming(
        &self,
        name: &str,
        value: &str,
    ) -> Result<(String, String), DecodingError> {
        if !self.percent_encode {
            return Ok((name.to_string(), value.to_string()));
        }
        let value = percent_decode(value.as_bytes())
            .decode_utf8()
            .with_context(|| {
                format!("Failed to percent-decode the value of the `{name}` cookie: `{value}`")
            })
            .map_err(|e| DecodingError {
                raw_value: value.to_string(),
                source: e,
            })?;
        Ok((name.to_string(), value.into_owned()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{source}")]
/// An error that occurred while percent-decoding a cookie value.
///
/// This error is returned by [`Processor::process_incoming`].
pub struct DecodingError {
    pub(crate) raw_value: String,
    #[source]
    pub(crate) source: anyhow::Error,
}

impl DecodingError {
    /// The value that could not be decoded.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// An error that occurred while reversing the base64 encoding of a cookie value.
///
/// This error is returned by [`Processor::reveal`] and [`Processor::decode_value`].
pub enum ValueDecodingError {
    #[error("The cookie value is not valid base64")]
    Base64(#[from] base64::DecodeError),
    #[error("The decoded cookie value is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
