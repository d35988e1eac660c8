//! Integration tests for the chain dispatch pipeline.
//!
//! These exercise the full resolve → filter → execute → short-circuit →
//! write-back flow with synthetic backends (no real index). Invocation and
//! resolution counters verify the laziness and at-most-once guarantees.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cascade_search::{
    empty_result, match_count, BackendResolver, BoxError, Chain, DispatchError, Dispatcher,
    DocList, QueryBackend, QueryParams, QueryRequest, QueryResponse, ResolvedBackend,
    ResponseHeader, ResponseValue, ResponseValues, ResultContext, SearcherHandle,
    RESPONSE_HEADER_KEY, RESPONSE_KEY,
};

/// Resolver backed by a fixed table, counting lookups per identifier.
struct SpyResolver {
    table: HashMap<String, ResolvedBackend>,
    lookups: Mutex<HashMap<String, usize>>,
}

impl SpyResolver {
    fn new(entries: Vec<(&str, ResolvedBackend)>) -> Arc<Self> {
        Arc::new(Self {
            table: entries
                .into_iter()
                .map(|(name, backend)| (name.to_owned(), backend))
                .collect(),
            lookups: Mutex::new(HashMap::new()),
        })
    }

    fn lookups(&self, name: &str) -> usize {
        *self.lookups.lock().unwrap().get(name).unwrap_or(&0)
    }
}

impl BackendResolver for SpyResolver {
    fn resolve(&self, _request: &QueryRequest, name: &str) -> Option<ResolvedBackend> {
        *self
            .lookups
            .lock()
            .unwrap()
            .entry(name.to_owned())
            .or_insert(0) += 1;
        self.table.get(name).cloned()
    }
}

/// Backend returning a fixed number of hits, counting invocations.
struct CannedBackend {
    hits: usize,
    calls: AtomicUsize,
}

impl CannedBackend {
    fn new(hits: usize) -> Arc<Self> {
        Arc::new(Self {
            hits,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn doc_list(hits: usize) -> DocList {
        DocList {
            offset: 0,
            ids: (0..hits as u64).collect(),
            scores: vec![1.0; hits],
            total: hits as u64,
            max_score: if hits == 0 { 0.0 } else { 1.0 },
        }
    }
}

#[async_trait]
impl QueryBackend for CannedBackend {
    async fn handle(
        &self,
        request: QueryRequest,
        response: &mut QueryResponse,
    ) -> Result<(), BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let context = ResultContext::new(
            Self::doc_list(self.hits),
            response.return_fields().clone(),
            request.searcher().clone(),
            None,
            request.params().clone(),
        );
        response.set(RESPONSE_KEY, ResponseValue::Results(context));
        Ok(())
    }
}

/// Backend that rewrites its private copy of the parameters and records the
/// query value it saw.
struct MutatingBackend {
    seen: Mutex<Option<String>>,
}

impl MutatingBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(None),
        })
    }
}

#[async_trait]
impl QueryBackend for MutatingBackend {
    async fn handle(
        &self,
        mut request: QueryRequest,
        _response: &mut QueryResponse,
    ) -> Result<(), BoxError> {
        *self.seen.lock().unwrap() = request.params().get("q").map(str::to_owned);
        request.params_mut().set("q", "rewritten");
        request.params_mut().set("injected", "true");
        Ok(())
    }
}

/// Backend that writes a debug section but no response entry at all.
struct BodylessBackend;

#[async_trait]
impl QueryBackend for BodylessBackend {
    async fn handle(
        &self,
        _request: QueryRequest,
        response: &mut QueryResponse,
    ) -> Result<(), BoxError> {
        response.set("debug", ResponseValue::Data(serde_json::json!({"hint": 1})));
        Ok(())
    }
}

fn sample_request() -> QueryRequest {
    QueryRequest::new(
        QueryParams::from_iter([("q", "wild flowers"), ("rows", "10")]),
        SearcherHandle::new("session".to_owned()),
    )
}

fn dispatcher(chain: &str, resolver: Arc<SpyResolver>) -> Dispatcher<Arc<SpyResolver>> {
    Dispatcher::new(Chain::parse(chain), resolver)
}

#[tokio::test]
async fn first_backend_with_matches_wins() {
    let rh1 = CannedBackend::new(0);
    let rh2 = CannedBackend::new(0);
    let rh3 = CannedBackend::new(3);
    let resolver = SpyResolver::new(vec![
        ("/rh1", ResolvedBackend::Query(rh1.clone())),
        ("/rh2", ResolvedBackend::Query(rh2.clone())),
        ("/rh3", ResolvedBackend::Query(rh3.clone())),
    ]);
    let dispatcher = dispatcher("/rh1,/rh2,/rh3", resolver);

    let request = sample_request();
    let mut response = QueryResponse::new();
    dispatcher
        .dispatch(&request, &mut response)
        .await
        .expect("dispatch succeeds");

    assert_eq!(match_count(response.values()), 3);
    assert_eq!(rh1.calls(), 1);
    assert_eq!(rh2.calls(), 1);
    assert_eq!(rh3.calls(), 1);
}

#[tokio::test]
async fn short_circuit_skips_the_rest_of_the_chain() {
    let rh1 = CannedBackend::new(2);
    let rh2 = CannedBackend::new(7);
    let resolver = SpyResolver::new(vec![
        ("/rh1", ResolvedBackend::Query(rh1.clone())),
        ("/rh2", ResolvedBackend::Query(rh2.clone())),
    ]);
    let dispatcher = dispatcher("/rh1,/rh2", resolver.clone());

    let request = sample_request();
    let mut response = QueryResponse::new();
    dispatcher
        .dispatch(&request, &mut response)
        .await
        .expect("dispatch succeeds");

    assert_eq!(match_count(response.values()), 2);
    assert_eq!(rh1.calls(), 1);
    assert_eq!(rh2.calls(), 0);

    // Entries past the winner are never even resolved.
    assert_eq!(resolver.lookups("/rh1"), 1);
    assert_eq!(resolver.lookups("/rh2"), 0);
}

#[tokio::test]
async fn winning_result_is_returned_exactly() {
    let rh1 = CannedBackend::new(2);
    let resolver = SpyResolver::new(vec![("/rh1", ResolvedBackend::Query(rh1))]);
    let dispatcher = dispatcher("/rh1", resolver);

    let request = sample_request();
    let mut response = QueryResponse::new();
    dispatcher
        .dispatch(&request, &mut response)
        .await
        .expect("dispatch succeeds");

    let mut expected = ResponseValues::new();
    expected.set(
        RESPONSE_HEADER_KEY,
        ResponseValue::Header(ResponseHeader::new()),
    );
    expected.set(
        RESPONSE_KEY,
        ResponseValue::Results(ResultContext::new(
            CannedBackend::doc_list(2),
            response.return_fields().clone(),
            request.searcher().clone(),
            None,
            request.params().clone(),
        )),
    );
    assert_eq!(response.values(), &expected);
}

#[tokio::test]
async fn all_non_query_entries_yield_the_empty_result() {
    let resolver = SpyResolver::new(vec![
        ("/admin", ResolvedBackend::Other),
        ("/ping", ResolvedBackend::Other),
    ]);
    let dispatcher = dispatcher("/admin,/ping", resolver.clone());

    let request = sample_request();
    let mut response = QueryResponse::new();
    dispatcher
        .dispatch(&request, &mut response)
        .await
        .expect("dispatch succeeds");

    assert_eq!(
        response.values(),
        &empty_result(&request, response.return_fields())
    );
    // Both entries were considered; neither was executable.
    assert_eq!(resolver.lookups("/admin"), 1);
    assert_eq!(resolver.lookups("/ping"), 1);
}

#[tokio::test]
async fn empty_chain_is_independent_of_query_contents() {
    let dispatcher = dispatcher("", SpyResolver::new(vec![]));

    for params in [
        QueryParams::new(),
        QueryParams::from_iter([("q", "*:*"), ("rows", "1000")]),
    ] {
        let request = QueryRequest::new(params, SearcherHandle::new(()));
        let mut response = QueryResponse::new();
        dispatcher
            .dispatch(&request, &mut response)
            .await
            .expect("dispatch succeeds");

        assert_eq!(match_count(response.values()), 0);
        let header = response
            .values()
            .get(RESPONSE_HEADER_KEY)
            .and_then(ResponseValue::as_header)
            .expect("header entry");
        assert!(header.is_empty());
    }
}

#[tokio::test]
async fn backends_work_on_an_isolated_parameter_copy() {
    let mutating = MutatingBackend::new();
    let fallback = CannedBackend::new(1);
    let resolver = SpyResolver::new(vec![
        ("/rewrite", ResolvedBackend::Query(mutating.clone())),
        ("/rh1", ResolvedBackend::Query(fallback)),
    ]);
    let dispatcher = dispatcher("/rewrite,/rh1", resolver);

    let request = sample_request();
    let mut response = QueryResponse::new();
    dispatcher
        .dispatch(&request, &mut response)
        .await
        .expect("dispatch succeeds");

    // The backend saw the real parameters...
    assert_eq!(
        mutating.seen.lock().unwrap().as_deref(),
        Some("wild flowers")
    );
    // ...but its rewrites stayed in its private copy.
    assert_eq!(request.params().get("q"), Some("wild flowers"));
    assert_eq!(request.params().get("injected"), None);

    // And the next attempt started from the original parameters again.
    let winner = response
        .values()
        .get(RESPONSE_KEY)
        .and_then(ResponseValue::as_results)
        .expect("response entry");
    assert_eq!(winner.origin().get("q"), Some("wild flowers"));
    assert_eq!(winner.origin().get("injected"), None);
}

#[tokio::test]
async fn outer_header_is_propagated_into_the_winning_result() {
    let rh1 = CannedBackend::new(1);
    let resolver = SpyResolver::new(vec![("/rh1", ResolvedBackend::Query(rh1))]);
    let dispatcher = dispatcher("/rh1", resolver);

    let request = sample_request();
    let mut response = QueryResponse::new();
    response
        .header_mut()
        .insert("params".into(), serde_json::json!({"q": "wild flowers"}));

    dispatcher
        .dispatch(&request, &mut response)
        .await
        .expect("dispatch succeeds");

    let header = response
        .values()
        .get(RESPONSE_HEADER_KEY)
        .and_then(ResponseValue::as_header)
        .expect("header entry");
    assert!(header.contains_key("params"));
}

#[tokio::test]
async fn bodyless_result_counts_as_zero_and_the_chain_continues() {
    let bodyless = Arc::new(BodylessBackend);
    let rh2 = CannedBackend::new(4);
    let resolver = SpyResolver::new(vec![
        ("/rh1", ResolvedBackend::Query(bodyless)),
        ("/rh2", ResolvedBackend::Query(rh2.clone())),
    ]);
    let dispatcher = dispatcher("/rh1,/rh2", resolver);

    let mut response = QueryResponse::new();
    dispatcher
        .dispatch(&sample_request(), &mut response)
        .await
        .expect("dispatch succeeds");

    assert_eq!(match_count(response.values()), 4);
    assert_eq!(rh2.calls(), 1);
}

#[tokio::test]
async fn backend_failure_surfaces_with_the_entry_identity() {
    struct Failing;

    #[async_trait]
    impl QueryBackend for Failing {
        async fn handle(
            &self,
            _request: QueryRequest,
            _response: &mut QueryResponse,
        ) -> Result<(), BoxError> {
            Err("segment merge in progress".into())
        }
    }

    let rh2 = CannedBackend::new(9);
    let resolver = SpyResolver::new(vec![
        ("/flaky", ResolvedBackend::Query(Arc::new(Failing))),
        ("/rh2", ResolvedBackend::Query(rh2.clone())),
    ]);
    let dispatcher = dispatcher("/flaky,/rh2", resolver.clone());

    let mut response = QueryResponse::new();
    let err = dispatcher
        .dispatch(&sample_request(), &mut response)
        .await
        .expect_err("dispatch fails");

    let DispatchError::Backend { backend, source } = err;
    assert_eq!(backend, "/flaky");
    assert_eq!(source.to_string(), "segment merge in progress");

    // No fallback was substituted and the rest of the chain never ran.
    assert!(response.values().is_empty());
    assert_eq!(rh2.calls(), 0);
    assert_eq!(resolver.lookups("/rh2"), 0);
}
