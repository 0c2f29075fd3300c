//! Simulates a browser across consecutive requests: the `Set-Cookie` headers
//! produced while handling one request are applied to a client-side jar,
//! which then builds the `Cookie` header of the next request.
use std::collections::BTreeMap;

use amaretti::{CookieStore, CookieValue, Processor, RequestCookies, ResponseCookies, StoreConfig};
use serde_json::{json, Map};

/// A minimal client: it only understands `name=value` and `Max-Age`.
#[derive(Default)]
struct Browser {
    jar: BTreeMap<String, String>,
}

impl Browser {
    fn cookie_header(&self) -> String {
        self.jar
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn receive(&mut self, response: &ResponseCookies) {
        for directive in response.header_values() {
            let mut parts = directive.split("; ");
            let (name, value) = parts.next().unwrap().split_once('=').unwrap();
            let expired = parts.any(|attribute| attribute == "Max-Age=0");
            if expired {
                self.jar.remove(name);
            } else {
                self.jar.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn request<F>(&mut self, handler: F)
    where
        F: FnOnce(&mut CookieStore),
    {
        let config = StoreConfig::default();
        let header = self.cookie_header();
        let request = RequestCookies::parse_header(&header, &Processor::from(&config)).unwrap();
        let mut store = CookieStore::with_config(request, ResponseCookies::new(), config);
        handler(&mut store);
        let (_, response) = store.into_parts();
        self.receive(&response);
    }
}

fn user() -> Map<String, serde_json::Value> {
    let mut user = Map::new();
    user.insert("name".into(), json!("Rafaël"));
    user.insert("home".into(), json!("/home/rafael"));
    user
}

#[test]
fn values_survive_the_round_trip_through_the_client() {
    let mut browser = Browser::default();

    browser.request(|store| {
        assert!(store.set("test", "new_test", 10, None, true));
        assert!(store.set("user", user(), 10, None, true));
        assert!(store.set("plain", "a; b=c", 10, None, false));
    });

    browser.request(|store| {
        assert_eq!(store.get("test", true).unwrap(), "new_test");
        assert_eq!(store.get("user", true), Some(CookieValue::Structured(user())));
        assert_eq!(store.get("plain", false).unwrap(), "a; b=c");
        assert!(store.has("test", Some("new_test"), true));
    });
}

#[test]
fn destroy_takes_effect_on_the_next_request() {
    let mut browser = Browser::default();
    browser.request(|store| {
        store.set("test", "new_test", 10, None, true);
    });

    browser.request(|store| {
        assert!(store.destroy("test", None));
        // Still visible until the client honours the directive.
        assert!(store.has("test", None, true));
    });

    browser.request(|store| {
        assert!(!store.has("test", None, true));
        assert_eq!(store.get("test", true), None);
    });
}

#[test]
fn set_doesnt_have_only_writes_once_across_requests() {
    let mut browser = Browser::default();
    browser.request(|store| {
        assert_eq!(store.set_doesnt_have("first_visit", "2024-03-10", 60, None, false), Some(true));
    });
    browser.request(|store| {
        assert_eq!(store.set_doesnt_have("first_visit", "2024-03-11", 60, None, false), None);
        assert_eq!(store.get("first_visit", true).unwrap(), "2024-03-10");
    });
    browser.request(|store| {
        assert_eq!(store.set_doesnt_have("first_visit", "ignored", 60, None, true), Some(true));
    });
    browser.request(|store| {
        assert!(!store.has("first_visit", None, true));
    });
}

#[test]
fn wrapper_cookies_travel_unencoded() {
    let mut browser = Browser::default();
    browser.request(|store| {
        assert!(store.cookie("theme").set_value("dark mode").save());
    });
    assert_eq!(browser.cookie_header(), "theme=dark%20mode");

    browser.request(|store| {
        assert!(store.cookie("theme").set_value("dark mode").has_cookie());
        assert!(store.cookie("theme").delete_and_unset());
        assert!(!store.has("theme", None, false));
    });
    assert_eq!(browser.cookie_header(), "");
}
