//! Query response model: ordered named values, headers, the empty result,
//! and match-count inspection.
//!
//! The dispatch outcome is a [`ResponseValues`] mapping carrying two
//! well-known entries: [`RESPONSE_KEY`] (a materialisable result context)
//! and [`RESPONSE_HEADER_KEY`] (diagnostic/status metadata). A mapping
//! without the expected `response` structure is a zero-match result by
//! policy, never an error.

use indexmap::IndexMap;
use serde::Serialize;

use crate::request::QueryRequest;
use crate::types::{DocList, ResultContext, ReturnFields};

/// Well-known key of the result-context entry in a response value mapping.
pub const RESPONSE_KEY: &str = "response";

/// Well-known key of the diagnostic/status entry in a response value mapping.
pub const RESPONSE_HEADER_KEY: &str = "responseHeader";

/// Diagnostic/status metadata attached to a response, in insertion order.
pub type ResponseHeader = IndexMap<String, serde_json::Value>;

/// A single named value inside a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// A materialisable search result.
    Results(ResultContext),
    /// A diagnostic/status header block.
    Header(ResponseHeader),
    /// Structured metadata: debug sections, facet blocks, highlighting.
    Data(serde_json::Value),
}

impl ResponseValue {
    /// Borrow the result context, if this value is one.
    pub fn as_results(&self) -> Option<&ResultContext> {
        match self {
            Self::Results(context) => Some(context),
            _ => None,
        }
    }

    /// Borrow the header block, if this value is one.
    pub fn as_header(&self) -> Option<&ResponseHeader> {
        match self {
            Self::Header(header) => Some(header),
            _ => None,
        }
    }
}

/// Insertion-ordered named values; the shape of a dispatch result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseValues(IndexMap<String, ResponseValue>);

impl ResponseValues {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a named value.
    pub fn get(&self, key: &str) -> Option<&ResponseValue> {
        self.0.get(key)
    }

    /// Set a named value, replacing any existing entry under the same key
    /// (the original entry's position is kept).
    pub fn set(&mut self, key: impl Into<String>, value: ResponseValue) {
        self.0.insert(key.into(), value);
    }

    /// Number of named values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping holds no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResponseValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for ResponseValues {
    type Item = (String, ResponseValue);
    type IntoIter = indexmap::map::IntoIter<String, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A query response: header, named body values, and the caller's field
/// selection.
///
/// The hosting pipeline hands the dispatcher a caller-owned response; each
/// dispatch attempt additionally gets its own [`scoped`](Self::scoped)
/// response so backends never see or leak unrelated state.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    header: ResponseHeader,
    values: ResponseValues,
    return_fields: ReturnFields,
}

impl QueryResponse {
    /// A fresh response with an empty header, no values, and all fields
    /// selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh response carrying the caller's field selection.
    pub fn with_return_fields(return_fields: ReturnFields) -> Self {
        Self {
            return_fields,
            ..Self::default()
        }
    }

    /// The response header.
    pub fn header(&self) -> &ResponseHeader {
        &self.header
    }

    /// Mutable access to the response header.
    pub fn header_mut(&mut self) -> &mut ResponseHeader {
        &mut self.header
    }

    /// The named body values.
    pub fn values(&self) -> &ResponseValues {
        &self.values
    }

    /// The caller's field-selection spec.
    pub fn return_fields(&self) -> &ReturnFields {
        &self.return_fields
    }

    /// Set a named body value, replacing any existing entry under the key.
    pub fn set(&mut self, key: impl Into<String>, value: ResponseValue) {
        self.values.set(key, value);
    }

    /// Build the response half of a per-attempt execution context: a copy of
    /// this response's header, an empty body, the same field selection.
    ///
    /// A pure builder: the outer response is not touched and the copy
    /// shares no mutable state with it.
    pub fn scoped(&self) -> QueryResponse {
        QueryResponse {
            header: self.header.clone(),
            values: ResponseValues::new(),
            return_fields: self.return_fields.clone(),
        }
    }

    /// The full value mapping of this response, with the header exposed
    /// under [`RESPONSE_HEADER_KEY`] ahead of the body entries.
    ///
    /// A body entry the backend wrote under that key itself takes
    /// precedence over the carried header.
    pub fn into_values(self) -> ResponseValues {
        let mut merged = ResponseValues::new();
        if self.values.get(RESPONSE_HEADER_KEY).is_none() {
            merged.set(RESPONSE_HEADER_KEY, ResponseValue::Header(self.header));
        }
        for (key, value) in self.values {
            merged.set(key, value);
        }
        merged
    }

    /// Write a final outcome's entries into this response's value set,
    /// replacing by key. Entries under other keys are left in place.
    pub fn set_all(&mut self, outcome: ResponseValues) {
        for (key, value) in outcome {
            self.values.set(key, value);
        }
    }
}

/// Build the null-object result: an empty document window plus a fresh,
/// empty header.
///
/// The `response` entry wraps the empty [`DocList`], the outer response's
/// field selection, the request's searcher, no transformer, and the
/// originating parameters. A pure constructor with no side effects, so it
/// doubles as a canonical zero-match value outside of dispatch.
pub fn empty_result(request: &QueryRequest, return_fields: &ReturnFields) -> ResponseValues {
    let context = ResultContext::new(
        DocList::empty(),
        return_fields.clone(),
        request.searcher().clone(),
        None,
        request.params().clone(),
    );

    let mut values = ResponseValues::new();
    values.set(RESPONSE_KEY, ResponseValue::Results(context));
    values.set(RESPONSE_HEADER_KEY, ResponseValue::Header(ResponseHeader::new()));
    values
}

/// Number of documents in a result's document window.
///
/// A mapping without a [`RESPONSE_KEY`] entry, or whose entry is not a
/// result context, counts as zero matches. Never panics and never errors:
/// the dispatch short-circuit relies on this predicate being total.
pub fn match_count(values: &ResponseValues) -> usize {
    match values.get(RESPONSE_KEY) {
        Some(ResponseValue::Results(context)) => context.doc_list().len(),
        Some(_) | None => 0,
    }
}
