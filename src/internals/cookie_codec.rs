use ::cookie::Cookie;
use ::http::HeaderValue;

/// Decodes a single `Set-Cookie` header.
///
/// Returns `None` for values which are not valid UTF-8,
/// or which the `cookie` crate refuses to parse.
pub fn decode_set_cookie(header: &HeaderValue) -> Option<Cookie<'static>> {
    let header_str = match header.to_str() {
        Ok(header_str) => header_str,
        Err(err) => {
            ::tracing::debug!(?err, "skipping Set-Cookie header that is not valid UTF-8");
            return None;
        }
    };

    match Cookie::parse(header_str) {
        Ok(cookie) => Some(cookie.into_owned()),
        Err(err) => {
            ::tracing::debug!(%err, header = header_str, "skipping malformed Set-Cookie header");
            None
        }
    }
}

/// Encodes cookies into the value of a `Cookie` request header.
///
/// Only the name and value are sent. An empty list gives an empty string.
pub fn encode_cookie_header<'a, I>(cookies: I) -> String
where
    I: IntoIterator<Item = &'a Cookie<'static>>,
{
    cookies
        .into_iter()
        .map(|cookie| cookie.stripped().to_string())
        .collect::<Vec<_>>()
        .join("; ")
}


#[cfg(test)]
mod test_encode_cookie_header {
    use super::*;

    #[test]
    fn it_should_encode_empty_list_as_empty_string() {
        let cookies: Vec<Cookie<'static>> = vec![];

        assert_eq!(encode_cookie_header(&cookies), "");
    }

    #[test]
    fn it_should_join_cookies_in_order_without_attributes() {
        let cookies = vec![
            Cookie::build(("first", "1")).path("/").http_only(true).build(),
            Cookie::build(("second", "2")).path("/a").build(),
        ];

        assert_eq!(encode_cookie_header(&cookies), "first=1; second=2");
    }
}
