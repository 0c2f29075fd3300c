/// The outbound boundary: where `Set-Cookie` directives are queued for the
/// outgoing response.
///
/// Implement it for whatever your HTTP framework uses to build responses.
/// The returned flag tells whether the directive was accepted for sending;
/// whether the client stores the cookie can never be observed server-side.
///
/// ```rust
/// use amaretti::ResponseSink;
///
/// struct HeaderMap(Vec<(String, String)>);
///
/// impl ResponseSink for HeaderMap {
///     fn queue_set_cookie(&mut self, directive: String) -> bool {
///         self.0.push(("set-cookie".to_string(), directive));
///         true
///     }
/// }
/// ```
pub trait ResponseSink {
    /// Queues a `Set-Cookie` header value.
    fn queue_set_cookie(&mut self, directive: String) -> bool;
}

impl<T: ResponseSink + ?Sized> ResponseSink for &mut T {
    fn queue_set_cookie(&mut self, directive: String) -> bool {
        (**self).queue_set_cookie(directive)
    }
}

/// Collects directives in order, never rejecting them.
impl ResponseSink for Vec<String> {
    fn queue_set_cookie(&mut self, directive: String) -> bool {
        self.push(directive);
        true
    }
}

#[derive(Default, Debug, Clone)]
/// The `Set-Cookie` header values queued for the response of the current request.
///
/// Once the response headers have been flushed to the client, mark the
/// collection with [`ResponseCookies::mark_sent()`]: from then on, new
/// directives are rejected.
///
/// ```rust
/// use amaretti::{ResponseCookies, ResponseSink};
///
/// let mut cookies = ResponseCookies::new();
/// assert!(cookies.queue_set_cookie("a=b; Path=/".to_string()));
///
/// cookies.mark_sent();
/// assert!(!cookies.queue_set_cookie("c=d; Path=/".to_string()));
///
/// assert_eq!(cookies.header_values().collect::<Vec<_>>(), ["a=b; Path=/"]);
/// ```
pub struct ResponseCookies {
    directives: Vec<String>,
    sent: bool,
}

impl ResponseCookies {
    /// Creates a new, empty [`ResponseCookies`] collection.
    pub fn new() -> ResponseCookies {
        Default::default()
    }

    /// Marks the response headers as sent to the client.
    pub fn mark_sent(&mut self) {
        self.sent = true;
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Iterates over the queued `Set-Cookie` header values, in insertion order.
    pub fn header_values(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().map(String::as_str)
    }

    /// Returns the last directive queued for the cookie called `name`.
    pub fn last_for(&self, name: &str) -> Option<&str> {
        self.directives
            .iter()
            .rev()
            .map(String::as_str)
            .find(|directive| {
                directive
                    .split_once('=')
                    .is_some_and(|(directive_name, _)| directive_name == name)
            })
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Takes the queued header values, leaving the collection empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.directives)
    }
}

impl ResponseSink for ResponseCookies {
    fn queue_set_cookie(&mut self, directive: String) -> bool {
        if self.sent {
            tracing::warn!(
                directive = %directive,
                "Cannot queue a `Set-Cookie` header, the response headers have already been sent"
            );
            return false;
        }
        self.directives.push(directive);
        true
    }
}
