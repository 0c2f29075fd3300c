//! A crate to read and write HTTP cookies from within a server-side request handler.
//!
//! # Overview
//!
//! `amaretti` wraps the two cookie primitives a server has at its disposal:
//!
//! - the cookies attached to the incoming request, via [`RequestCookies`]
//! - the `Set-Cookie` headers queued on the outgoing response, via [`ResponseSink`]
//!
//! On top of them it provides:
//!
//! - [`CookieStore`], a per-request facade with `set`, `get`, `has`, `destroy` and friends
//! - [`Cookie`], a fluent wrapper around a single cookie bound to a store
//! - [`CookieAttributes`] and [`Directive`], to build `Set-Cookie` header values by hand
//!
//! In particular:
//!
//! - Values written by the store are mirrored into the request-side view, so
//!   they can be read back within the same request
//! - Key-value maps are stored as JSON, see [`CookieValue`]
//! - Values can be base64-encoded, as an obfuscation measure. This is **not**
//!   encryption and provides no security guarantee
//! - Nothing panics or raises: writes return `bool`, reads return `Option`
//!
//! # Quickstart
//!
//! ```rust
//! use amaretti::{CookieStore, Processor, RequestCookies, ResponseCookies, StoreConfig};
//! use serde_json::{json, Map};
//!
//! let config = StoreConfig::default();
//! let processor = Processor::from(&config);
//!
//! // Start from the `Cookie` header of the incoming request...
//! let request = RequestCookies::parse_header("visits=Mw%3D%3D", &processor).unwrap();
//! // ...and collect `Set-Cookie` headers for the response.
//! let mut store = CookieStore::with_config(request, ResponseCookies::new(), config);
//!
//! assert_eq!(store.get("visits", true).unwrap(), "3");
//! assert!(store.set("visits", "4", 60, None, true));
//! assert_eq!(store.get("visits", true).unwrap(), "4");
//!
//! // Maps round-trip as JSON.
//! let mut user = Map::new();
//! user.insert("name".into(), json!("Rafael"));
//! user.insert("role".into(), json!("Developer"));
//! store.set("user", user, 10, None, true);
//! assert_eq!(store.get("user", true).unwrap().get("role"), Some(&json!("Developer")));
//!
//! // Remove a cookie from the client and from the current view.
//! store.destroy_and_unset("visits", None);
//! assert!(!store.has("visits", None, true));
//!
//! let (_, response) = store.into_parts();
//! for header_value in response.header_values() {
//!     // Attach each value to the response as a `Set-Cookie` header.
//!     assert!(header_value.contains("; Path=/; HttpOnly"));
//! }
//! ```
//!
//! ## Credits
//!
//! `amaretti` borrows the cookie modelling and header formatting approach of
//! [`biscotti`](https://crates.io/crates/biscotti) and the
//! [`cookie` crate](https://crates.io/crates/cookie).

pub mod config;
mod attributes;
mod cookie;
mod directive;
mod encoding;
mod expiration;
mod processor;
mod removal;
mod request_cookies;
mod response_cookies;
mod store;
mod value;

pub use attributes::CookieAttributes;
pub use config::StoreConfig;
pub use cookie::Cookie;
pub use directive::Directive;
pub use expiration::Expiration;
pub use processor::Processor;
pub use removal::RemovalCookie;
pub use request_cookies::RequestCookies;
pub use response_cookies::{ResponseCookies, ResponseSink};
pub use store::CookieStore;
pub use time;
pub use value::CookieValue;

/// Errors that can occur when using `amaretti`.
pub mod errors {
    pub use crate::attributes::{InvalidAttributeError, InvalidCookieError, InvalidNameError};
    pub use crate::processor::{DecodingError, ValueDecodingError};
    pub use crate::request_cookies::{EmptyNameError, MissingPairError, ParseError};
}
