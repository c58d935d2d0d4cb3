use ::cookie::Cookie;
use ::http::HeaderValue;
use ::http::header::SET_COOKIE;

use crate::ReceivedResponse;
use crate::internals::decode_set_cookie;
use crate::internals::encode_cookie_header;

const ROOT_PATH: &str = "/";

///
/// A path scoped cookie jar, which behaves like a (simplified) browser.
///
/// Cookies are grouped by the path they were set with.
/// A cookie set without a path, or with an empty one, is stored at `/`.
///
///  * Storing a cookie replaces any cookie with the same name at the same path,
///    and makes it the most recent.
///  * Storing a cookie with an empty value deletes every cookie with that name,
///    from every path.
///
/// Expiry, `Secure`, and domain matching are not taken into account.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieStore {
    buckets: Vec<CookieBucket>,
}

#[derive(Debug, Clone, PartialEq)]
struct CookieBucket {
    path: String,

    /// Most recently set last.
    cookies: Vec<Cookie<'static>>,
}

impl CookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores every `Set-Cookie` header found on the response.
    pub fn record(&mut self, response: &ReceivedResponse) {
        self.record_headers(response.headers().get_all(SET_COOKIE));
    }

    /// Stores the cookies from the given `Set-Cookie` header values.
    ///
    /// Headers which cannot be decoded are skipped,
    /// and the rest are still stored.
    pub fn record_headers<'a, I>(&mut self, set_cookie_headers: I)
    where
        I: IntoIterator<Item = &'a HeaderValue>,
    {
        for header in set_cookie_headers {
            if let Some(cookie) = decode_set_cookie(header) {
                self.store_cookie(cookie);
            }
        }
    }

    /// Stores a single cookie, applying the replace and delete rules.
    ///
    /// A quoted empty value, such as `name=""`, also counts as empty.
    pub fn store_cookie(&mut self, cookie: Cookie<'static>) {
        if cookie.value_trimmed().is_empty() {
            self.remove_everywhere(cookie.name());
            return;
        }

        let path = normalize_cookie_path(cookie.path()).to_string();
        let bucket_index = match self.buckets.iter().position(|bucket| bucket.path == path) {
            Some(index) => index,
            None => {
                self.buckets.push(CookieBucket {
                    path,
                    cookies: Vec::new(),
                });
                self.buckets.len() - 1
            }
        };

        let bucket = &mut self.buckets[bucket_index];
        bucket
            .cookies
            .retain(|existing| existing.name() != cookie.name());
        bucket.cookies.push(cookie);
    }

    /// Returns the cookies to send on a request to the given path.
    ///
    /// Cookies stored at `/` always match. Cookies stored at any other path match
    /// when the request path starts with it. An empty or `/` request path only
    /// receives the cookies stored at `/`.
    ///
    /// The order is by path (in the order the paths were first seen),
    /// then by recency within that path.
    pub fn matching(&self, request_path: &str) -> Vec<Cookie<'static>> {
        let is_root_request = request_path.is_empty() || request_path == ROOT_PATH;

        self.buckets
            .iter()
            .filter(|bucket| {
                if bucket.path == ROOT_PATH {
                    true
                } else {
                    !is_root_request && request_path.starts_with(bucket.path.as_str())
                }
            })
            .flat_map(|bucket| bucket.cookies.iter().cloned())
            .collect()
    }

    /// The value of the `Cookie` header for a request to the given path.
    ///
    /// This is an empty string when no cookies match.
    pub fn cookie_header(&self, request_path: &str) -> String {
        encode_cookie_header(&self.matching(request_path))
    }

    /// Removes all cookies.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.cookies.is_empty())
    }

    fn remove_everywhere(&mut self, name: &str) {
        ::tracing::debug!(name, "deleting cookie from all paths");

        for bucket in &mut self.buckets {
            bucket.cookies.retain(|existing| existing.name() != name);
        }
    }
}

fn normalize_cookie_path(path: Option<&str>) -> &str {
    match path {
        Some(path) if !path.is_empty() => path,
        _ => ROOT_PATH,
    }
}

#[cfg(test)]
fn store_from_headers(headers: &[&'static str]) -> CookieStore {
    let values: Vec<HeaderValue> = headers
        .iter()
        .map(|header| HeaderValue::from_static(*header))
        .collect();

    let mut store = CookieStore::new();
    store.record_headers(values.iter());
    store
}

#[cfg(test)]
fn names_and_values(cookies: &[Cookie<'static>]) -> Vec<(String, String)> {
    cookies
        .iter()
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
        .collect()
}




#[cfg(test)]
mod test_cookie_header {
    use super::*;

    #[test]
    fn it_should_be_empty_without_cookies() {
        let store = CookieStore::new();

        assert_eq!(store.cookie_header("/"), "");
    }

    #[test]
    fn it_should_join_matching_cookies() {
        let store = store_from_headers(&["one=1; Path=/a", "root=r; HttpOnly"]);

        assert_eq!(store.cookie_header("/a/x"), "one=1; root=r");
    }
}
