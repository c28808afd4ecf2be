//! Purpose: Cursor over paginated mirror node collections.
//! Exports: `Page`, `RestPage`, `Pages`.
//! Role: One pagination algorithm shared by every JSON representation and every list query.
//! Invariants: A page fetches at most once; its outcome (data or error) is cached.
//! Invariants: Advancing builds a new page; a page never mutates after it is loaded.
//! Invariants: `links.next` that is missing, null, or empty means there is no next page.
//! Notes: Construction and `is_first` never touch the network.
use std::fmt;
use std::sync::{Arc, OnceLock};

use url::Url;

use crate::core::document::{Document, JsonRepr, truncate};
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::mirror::rest::RestClient;

/// A read-only, possibly multi-page result set.
pub trait Page<T>: Sized {
    /// 0-based position in the chain.
    fn page_index(&self) -> usize;

    fn size(&self) -> ApiResult<usize>;

    /// This page's elements in server order.
    fn data(&self) -> ApiResult<&[T]>;

    fn has_next(&self) -> ApiResult<bool>;

    /// Fails with `InvalidState` when there is no next page.
    fn next(&self) -> ApiResult<Self>;

    fn first(&self) -> Self;

    fn is_first(&self) -> bool;
}

pub(crate) type PageConversion<J, T> = Arc<dyn Fn(&J) -> ApiResult<Vec<T>> + Send + Sync>;

pub struct RestPage<R: RestClient, T> {
    client: Arc<R>,
    path: String,
    root_path: String,
    index: usize,
    convert: PageConversion<R::Json, T>,
    loaded: OnceLock<Result<Loaded<T>, Error>>,
}

struct Loaded<T> {
    data: Vec<T>,
    next_path: Option<String>,
}

impl<R: RestClient, T> RestPage<R, T> {
    /// Page 0 of the collection at `path`. Nothing is fetched yet.
    pub fn new<F>(client: Arc<R>, path: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&R::Json) -> ApiResult<Vec<T>> + Send + Sync + 'static,
    {
        let path = path.into();
        Self::at(client, path.clone(), path, 0, Arc::new(convert))
    }

    fn at(
        client: Arc<R>,
        path: String,
        root_path: String,
        index: usize,
        convert: PageConversion<R::Json, T>,
    ) -> Self {
        Self {
            client,
            path,
            root_path,
            index,
            convert,
            loaded: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Path of the next page as the server reported it, fetching this page if needed.
    pub fn next_path(&self) -> ApiResult<Option<&str>> {
        Ok(self.load()?.next_path.as_deref())
    }

    /// Walks this page and every page after it.
    pub fn pages(self) -> Pages<R, T> {
        Pages {
            pending: Some(self),
        }
    }

    fn load(&self) -> ApiResult<&Loaded<T>> {
        self.loaded
            .get_or_init(|| self.fetch())
            .as_ref()
            .map_err(Error::clone)
    }

    fn fetch(&self) -> Result<Loaded<T>, Error> {
        let json = self.client.do_get(&self.path)?;
        let data = (self.convert)(&json).map_err(|err| {
            let mut wrapped = Error::new(ErrorKind::InvalidState)
                .with_message(format!("page {} could not be converted", self.index))
                .with_path(self.path.as_str());
            if let Some(document) = err.document() {
                wrapped = wrapped.with_document(document);
            }
            wrapped.with_source(err)
        })?;
        let next_path = next_link(&json.as_document())?;
        tracing::debug!(
            path = %self.path,
            index = self.index,
            size = data.len(),
            has_next = next_path.is_some(),
            "mirror page fetched"
        );
        Ok(Loaded { data, next_path })
    }
}

impl<R: RestClient, T: Clone> RestPage<R, T> {
    /// Every element from this page to the end of the chain.
    pub fn collect_all(self) -> ApiResult<Vec<T>> {
        let mut all = Vec::new();
        for page in self.pages() {
            all.extend_from_slice(page?.data()?);
        }
        Ok(all)
    }
}

impl<R: RestClient, T> Page<T> for RestPage<R, T> {
    fn page_index(&self) -> usize {
        self.index
    }

    fn size(&self) -> ApiResult<usize> {
        Ok(self.load()?.data.len())
    }

    fn data(&self) -> ApiResult<&[T]> {
        Ok(&self.load()?.data)
    }

    fn has_next(&self) -> ApiResult<bool> {
        Ok(self.load()?.next_path.is_some())
    }

    fn next(&self) -> ApiResult<Self> {
        let Some(next_path) = self.load()?.next_path.clone() else {
            return Err(Error::new(ErrorKind::InvalidState)
                .with_message(format!("page {} is the last page", self.index))
                .with_path(self.path.as_str()));
        };
        Ok(Self::at(
            Arc::clone(&self.client),
            next_path,
            self.root_path.clone(),
            self.index + 1,
            Arc::clone(&self.convert),
        ))
    }

    fn first(&self) -> Self {
        Self::at(
            Arc::clone(&self.client),
            self.root_path.clone(),
            self.root_path.clone(),
            0,
            Arc::clone(&self.convert),
        )
    }

    fn is_first(&self) -> bool {
        self.path == self.root_path
    }
}

impl<R: RestClient, T> fmt::Debug for RestPage<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestPage")
            .field("path", &self.path)
            .field("root_path", &self.root_path)
            .field("index", &self.index)
            .field("loaded", &self.loaded.get().is_some())
            .finish()
    }
}

/// Iterator over a page chain. Stops after the last page or after the first error.
pub struct Pages<R: RestClient, T> {
    pending: Option<RestPage<R, T>>,
}

impl<R: RestClient, T> Iterator for Pages<R, T> {
    type Item = ApiResult<RestPage<R, T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.pending.take()?;
        match page.has_next() {
            Ok(true) => match Page::next(&page) {
                Ok(next) => self.pending = Some(next),
                Err(err) => return Some(Err(err)),
            },
            Ok(false) => {}
            Err(err) => return Some(Err(err)),
        }
        Some(Ok(page))
    }
}

/// Reads `links.next`. Servers send either a path (`/api/v1/...?...`) or a full URL;
/// only the path and query are kept so the page stays on the configured base URL.
fn next_link(document: &Document) -> ApiResult<Option<String>> {
    let Some(next) = document.pointer("links.next") else {
        return Ok(None);
    };
    let link = match next {
        Document::Null => return Ok(None),
        Document::String(link) if link.trim().is_empty() => return Ok(None),
        Document::String(link) => link.trim(),
        other => {
            return Err(Error::new(ErrorKind::Parse)
                .with_message(format!("links.next must be a string, found {}", other.type_name()))
                .with_document(truncate(&document.to_json_string())));
        }
    };
    if link.starts_with('/') {
        return Ok(Some(link.to_string()));
    }
    let url = Url::parse(link).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message(format!("links.next '{link}' is neither a path nor a url"))
            .with_source(err)
    })?;
    Ok(Some(match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::{Page, RestPage};
    use crate::core::error::{ApiResult, Error, ErrorKind};
    use crate::mirror::rest::RestClient;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRest {
        responses: HashMap<String, Value>,
        calls: AtomicUsize,
    }

    impl CountingRest {
        fn with(mut self, path: &str, body: Value) -> Self {
            self.responses.insert(path.to_string(), body);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RestClient for CountingRest {
        type Json = Value;

        fn do_get(&self, path: &str) -> ApiResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.get(path).cloned().ok_or_else(|| {
                Error::new(ErrorKind::QueryFailure).with_message(format!("no fixture for {path}"))
            })
        }
    }

    fn numbers(json: &Value) -> ApiResult<Vec<i64>> {
        let items = json["items"].as_array().cloned().unwrap_or_default();
        items
            .iter()
            .map(|item| {
                item.as_i64().ok_or_else(|| {
                    Error::new(ErrorKind::Parse).with_message(format!("{item} is not a number"))
                })
            })
            .collect()
    }

    fn three_pages() -> Arc<CountingRest> {
        Arc::new(
            CountingRest::default()
                .with("/items", json!({"items": [1, 2], "links": {"next": "/items?page=2"}}))
                .with(
                    "/items?page=2",
                    json!({"items": [3, 4], "links": {"next": "http://mirror.test/items?page=3"}}),
                )
                .with("/items?page=3", json!({"items": [5], "links": {"next": null}})),
        )
    }

    #[test]
    fn missing_null_or_empty_next_link_ends_the_chain() {
        for body in [
            json!({"items": []}),
            json!({"items": [1], "links": {}}),
            json!({"items": [1], "links": {"next": null}}),
            json!({"items": [1], "links": {"next": ""}}),
        ] {
            let rest = Arc::new(CountingRest::default().with("/items", body));
            let page = RestPage::new(rest, "/items", numbers);
            assert!(!page.has_next().expect("has_next"));
        }
    }

    #[test]
    fn construction_and_is_first_do_not_fetch() {
        let rest = three_pages();
        let page = RestPage::new(Arc::clone(&rest), "/items", numbers);
        assert!(page.is_first());
        assert_eq!(page.page_index(), 0);
        assert_eq!(rest.calls(), 0);
        assert_eq!(page.data().expect("data"), &[1, 2]);
        assert_eq!(page.size().expect("size"), 2);
        assert_eq!(rest.calls(), 1);
    }

    #[test]
    fn first_is_first_for_every_page_in_the_chain() {
        let rest = three_pages();
        let page0 = RestPage::new(rest, "/items", numbers);
        let page1 = page0.next().expect("page1");
        let page2 = page1.next().expect("page2");
        for page in [&page0, &page1, &page2] {
            let first = page.first();
            assert!(first.is_first());
            assert!(first.first().is_first());
            assert_eq!(first.page_index(), 0);
        }
        assert!(!page1.is_first());
        assert_eq!(page2.page_index(), 2);
        assert_eq!(page2.path(), "/items?page=3");
    }

    #[test]
    fn next_on_last_page_fails_without_fetching() {
        let rest = Arc::new(
            CountingRest::default().with("/items", json!({"items": [1], "links": {"next": null}})),
        );
        let page = RestPage::new(Arc::clone(&rest), "/items", numbers);
        assert!(!page.has_next().expect("has_next"));
        let calls = rest.calls();
        let err = page.next().expect_err("last page");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(rest.calls(), calls);
    }

    #[test]
    fn conversion_failure_is_cached_invalid_state() {
        let rest = Arc::new(CountingRest::default().with("/items", json!({"items": ["x"]})));
        let page = RestPage::new(Arc::clone(&rest), "/items", numbers);
        let err = page.data().expect_err("bad item");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let again = page.has_next().expect_err("cached");
        assert_eq!(again.kind(), ErrorKind::InvalidState);
        assert_eq!(rest.calls(), 1);
    }

    #[test]
    fn transport_failure_keeps_its_kind() {
        let rest = Arc::new(CountingRest::default());
        let page = RestPage::new(rest, "/missing", numbers);
        let err = page.data().expect_err("no fixture");
        assert_eq!(err.kind(), ErrorKind::QueryFailure);
    }

    #[test]
    fn collect_all_walks_every_page() {
        let rest = three_pages();
        let page = RestPage::new(Arc::clone(&rest), "/items", numbers);
        assert_eq!(page.collect_all().expect("all"), vec![1, 2, 3, 4, 5]);
        assert_eq!(rest.calls(), 3);
    }

    #[test]
    fn pages_iterator_reports_indices() {
        let page = RestPage::new(three_pages(), "/items", numbers);
        let indices: Vec<usize> = page
            .pages()
            .map(|page| page.expect("page").page_index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
