use ::anyhow::Result;
use ::serde::Serialize;
use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;
use ::url::Url;

/// Query parameters that get appended to every request a client makes.
///
/// Each entry is an already url encoded chunk, such as `key=value&other=value`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParamsStore {
    query_params: Vec<String>,
}

impl QueryParamsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes the value with `serde_urlencoded`, and stores the result.
    ///
    /// Values which serialize to nothing are not stored.
    pub fn add<V>(&mut self, query_params: V) -> Result<()>
    where
        V: Serialize,
    {
        let encoded = ::serde_urlencoded::to_string(query_params)?;
        if !encoded.is_empty() {
            self.add_raw(encoded);
        }

        Ok(())
    }

    pub fn add_raw(&mut self, encoded: String) {
        self.query_params.push(encoded);
    }

    pub fn clear(&mut self) {
        self.query_params.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.query_params.is_empty()
    }

    /// Appends the stored parameters onto the url,
    /// after any query the url already has.
    pub fn apply_to_url(&self, url: &mut Url) {
        if self.is_empty() {
            return;
        }

        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{self}"),
            _ => self.to_string(),
        };
        url.set_query(Some(&query));
    }
}

impl Display for QueryParamsStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.query_params.join("&"))
    }
}


#[cfg(test)]
mod test_apply_to_url {
    use super::*;

    #[test]
    fn it_should_leave_url_untouched_when_empty() {
        let params = QueryParamsStore::new();
        let mut url = Url::parse("http://localhost/users").unwrap();

        params.apply_to_url(&mut url);

        assert_eq!(url.as_str(), "http://localhost/users");
    }

    #[test]
    fn it_should_set_query_on_url_without_one() {
        let mut params = QueryParamsStore::new();
        params.add_raw("page=2".to_string());
        let mut url = Url::parse("http://localhost/users").unwrap();

        params.apply_to_url(&mut url);

        assert_eq!(url.as_str(), "http://localhost/users?page=2");
    }

    #[test]
    fn it_should_append_after_existing_query() {
        let mut params = QueryParamsStore::new();
        params.add_raw("page=2".to_string());
        let mut url = Url::parse("http://localhost/users?sort=name").unwrap();

        params.apply_to_url(&mut url);

        assert_eq!(url.as_str(), "http://localhost/users?sort=name&page=2");
    }
}
