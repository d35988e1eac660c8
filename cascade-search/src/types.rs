//! Result materialisation types: document lists, field selection, result
//! contexts.
//!
//! A backend's answer is not a list of rendered documents but a
//! [`ResultContext`]: a window of matching document ids plus everything
//! needed to materialise them later, such as the searcher they came from
//! and the caller's field selection.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::request::{QueryParams, SearcherHandle};

/// An ordered window of matching document ids plus the metadata needed to
/// materialise them later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocList {
    /// Offset of this window within the full match set.
    pub offset: usize,
    /// Internal ids of the documents in this window.
    pub ids: Vec<u64>,
    /// Per-document relevance scores, parallel to `ids`.
    pub scores: Vec<f32>,
    /// Total matches across the whole index, beyond this window.
    pub total: u64,
    /// Highest score across the full match set.
    pub max_score: f32,
}

impl DocList {
    /// The empty sentinel: zero offset, zero length, zero total, zero score.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of documents in this window.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the window holds no documents.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The caller's field-selection spec, carried from the outer response into
/// result contexts so materialisation honours it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnFields {
    /// Requested field names; `None` means all stored fields.
    pub fields: Option<Vec<String>>,
}

impl ReturnFields {
    /// A spec selecting all stored fields.
    pub fn all() -> Self {
        Self { fields: None }
    }

    /// A spec selecting only the named fields.
    pub fn only<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: Some(fields.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether `field` should be included when materialising documents.
    pub fn wants(&self, field: &str) -> bool {
        match &self.fields {
            None => true,
            Some(fields) => fields.iter().any(|f| f == field),
        }
    }
}

/// Rewrites a materialised document before it is returned to the caller.
pub trait DocTransformer: Send + Sync {
    /// Mutate a single materialised document in place.
    fn transform(&self, doc: &mut serde_json::Map<String, serde_json::Value>);
}

/// The structured outcome of one backend invocation: a document window plus
/// everything needed to materialise it later.
#[derive(Clone)]
pub struct ResultContext {
    doc_list: DocList,
    return_fields: ReturnFields,
    searcher: SearcherHandle,
    transformer: Option<Arc<dyn DocTransformer>>,
    origin: QueryParams,
}

impl ResultContext {
    /// Assemble a result context.
    pub fn new(
        doc_list: DocList,
        return_fields: ReturnFields,
        searcher: SearcherHandle,
        transformer: Option<Arc<dyn DocTransformer>>,
        origin: QueryParams,
    ) -> Self {
        Self {
            doc_list,
            return_fields,
            searcher,
            transformer,
            origin,
        }
    }

    /// The window of matching documents.
    pub fn doc_list(&self) -> &DocList {
        &self.doc_list
    }

    /// The field-selection spec materialisation must honour.
    pub fn return_fields(&self) -> &ReturnFields {
        &self.return_fields
    }

    /// The searcher the documents can be materialised from.
    pub fn searcher(&self) -> &SearcherHandle {
        &self.searcher
    }

    /// The transformer to apply per document, if any.
    pub fn transformer(&self) -> Option<&dyn DocTransformer> {
        self.transformer.as_deref()
    }

    /// Parameters of the query that produced this result.
    pub fn origin(&self) -> &QueryParams {
        &self.origin
    }
}

impl fmt::Debug for ResultContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultContext")
            .field("doc_list", &self.doc_list)
            .field("return_fields", &self.return_fields)
            .field("transformer", &self.transformer.as_ref().map(|_| ".."))
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ResultContext {
    fn eq(&self, other: &Self) -> bool {
        self.doc_list == other.doc_list
            && self.return_fields == other.return_fields
            && self.origin == other.origin
            && self.searcher.ptr_eq(&other.searcher)
            && match (&self.transformer, &other.transformer) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }
}

/// Serializes the materialisable surface only: the document window, the
/// field selection, and the originating parameters. The searcher handle and
/// transformer are runtime resources and stay out of the wire shape.
impl Serialize for ResultContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResultContext", 3)?;
        state.serialize_field("doc_list", &self.doc_list)?;
        state.serialize_field("return_fields", &self.return_fields)?;
        state.serialize_field("origin", &self.origin)?;
        state.end()
    }
}
