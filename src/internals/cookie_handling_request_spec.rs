use ::anyhow::anyhow;
use ::http::HeaderValue;
use ::http::header;
use ::std::ops::Deref;
use ::std::ops::DerefMut;
use ::std::sync::Arc;
use ::std::sync::Mutex;

use crate::CookieStore;
use crate::ReceivedResponse;
use crate::RedirectHandler;
use crate::RequestAction;
use crate::RequestSpec;
use crate::internals::with_this_mut;

///
/// Wraps the spec of a single hop, adding cookie handling to it.
///
/// On creation the stored cookies matching the hop's url are set as the
/// `Cookie` header (empty when none match). Customizations then run against it
/// through `DerefMut`. Finally [`CookieHandlingRequestSpec::seal`] wraps whatever
/// redirect handler they registered, so that on a redirect:
///
///  1. cookies from the redirect response are stored,
///  2. the registered handler (if any) is asked for a customization,
///  3. the next hop is wrapped in a new `CookieHandlingRequestSpec`,
///     and that customization runs against it.
///
/// The next hop is wrapped even when no customization is returned,
/// so cookies are applied on every hop.
///
pub struct CookieHandlingRequestSpec<'a> {
    spec: &'a mut RequestSpec,
    cookie_store: Arc<Mutex<CookieStore>>,
}

impl<'a> CookieHandlingRequestSpec<'a> {
    /// Wraps the spec for the first hop of a request.
    pub fn new(spec: &'a mut RequestSpec, cookie_store: Arc<Mutex<CookieStore>>) -> Self {
        Self::with_redirect_handler(spec, cookie_store, None)
    }

    fn with_redirect_handler(
        spec: &'a mut RequestSpec,
        cookie_store: Arc<Mutex<CookieStore>>,
        redirect_handler: Option<RedirectHandler>,
    ) -> Self {
        spec.set_redirect_handler(redirect_handler);
        apply_cookies(spec, &cookie_store);

        Self { spec, cookie_store }
    }

    /// Installs the cookie handling redirect handler,
    /// around the handler the customizations left on the spec.
    pub fn seal(self) {
        let user_handler = self.spec.take_redirect_handler();
        let handler = new_cookie_redirect_handler(self.cookie_store, user_handler);

        self.spec.set_redirect_handler(Some(handler));
    }
}

impl Deref for CookieHandlingRequestSpec<'_> {
    type Target = RequestSpec;

    fn deref(&self) -> &Self::Target {
        self.spec
    }
}

impl DerefMut for CookieHandlingRequestSpec<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.spec
    }
}

fn apply_cookies(spec: &mut RequestSpec, cookie_store: &Mutex<CookieStore>) {
    let request_path = spec.url().path().to_string();
    let cookie_header = with_this_mut(cookie_store, |store| store.cookie_header(&request_path));
    ::tracing::trace!(path = %request_path, cookies = %cookie_header, "applying cookies");

    match HeaderValue::from_str(&cookie_header) {
        Ok(header_value) => {
            spec.set_header(header::COOKIE, header_value);
        }
        Err(err) => {
            spec.fail(anyhow!(err).context(format!(
                "Stored cookies cannot be sent as a header, '{cookie_header}'"
            )));
        }
    }
}

fn new_cookie_redirect_handler(
    cookie_store: Arc<Mutex<CookieStore>>,
    user_handler: Option<RedirectHandler>,
) -> RedirectHandler {
    Arc::new(move |response: &ReceivedResponse| {
        with_this_mut(&cookie_store, |store| store.record(response));

        let user_action = user_handler.as_ref().and_then(|handler| handler(response));
        let cookie_store = cookie_store.clone();
        let user_handler = user_handler.clone();

        let next_hop_action: RequestAction = Arc::new(move |next_spec: &mut RequestSpec| {
            let mut decorated = CookieHandlingRequestSpec::with_redirect_handler(
                next_spec,
                cookie_store.clone(),
                user_handler.clone(),
            );

            if let Some(user_action) = &user_action {
                user_action(&mut *decorated);
            }

            decorated.seal();
        });

        Some(next_hop_action)
    })
}

#[cfg(test)]
mod test_new {
    use super::*;
    use ::url::Url;

    fn new_store(headers: &[&'static str]) -> Arc<Mutex<CookieStore>> {
        let values: Vec<HeaderValue> = headers
            .iter()
            .map(|header| HeaderValue::from_static(*header))
            .collect();

        let mut store = CookieStore::new();
        store.record_headers(values.iter());
        Arc::new(Mutex::new(store))
    }

    fn new_spec(url: &str) -> RequestSpec {
        RequestSpec::new(Url::parse(url).unwrap())
    }

    #[test]
    fn it_should_apply_matching_cookies() {
        let store = new_store(&["root=1", "admin=2; Path=/admin", "other=3; Path=/other"]);
        let mut spec = new_spec("http://localhost/admin/users");

        CookieHandlingRequestSpec::new(&mut spec, store).seal();

        assert_eq!(spec.headers().get(header::COOKIE).unwrap(), "root=1; admin=2");
    }

    #[test]
    fn it_should_send_empty_cookie_header_without_cookies() {
        let store = new_store(&[]);
        let mut spec = new_spec("http://localhost/");

        CookieHandlingRequestSpec::new(&mut spec, store).seal();

        assert_eq!(spec.headers().get(header::COOKIE).unwrap(), "");
    }

    #[test]
    fn it_should_install_redirect_handler_when_none_set() {
        let store = new_store(&[]);
        let mut spec = new_spec("http://localhost/");

        CookieHandlingRequestSpec::new(&mut spec, store).seal();

        assert!(spec.redirect_handler().is_some());
    }

    #[test]
    fn it_should_let_customizations_override_cookie_header() {
        let store = new_store(&["root=1"]);
        let mut spec = new_spec("http://localhost/");

        let mut decorated = CookieHandlingRequestSpec::new(&mut spec, store);
        decorated.set_header(header::COOKIE, HeaderValue::from_static("custom=1"));
        decorated.seal();

        assert_eq!(spec.headers().get(header::COOKIE).unwrap(), "custom=1");
    }
}
