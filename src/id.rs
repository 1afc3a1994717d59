//! Document and internal-id types
//!
//! The document store and internal-id allocator are named collaborators
//! this crate consumes but does not implement (§1: out of scope). This
//! module defines the collaborator's contract as a trait — [`InternalIdStore`]
//! — plus [`DocumentId`] and [`InternalId`], the two identifier types that
//! cross the boundary. A minimal [`SequentialIdStore`] is provided so this
//! crate's own tests can exercise the indexing core end to end without
//! pulling in a real document store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An opaque external identifier for a document, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentId {
    Str(String),
    Int(i64),
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId::Str(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        DocumentId::Str(s)
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self {
        DocumentId::Int(n)
    }
}

/// A compact unsigned integer identifier allocated by the id store. Every
/// sub-index in this crate stores only `InternalId`s, never `DocumentId`s —
/// dense `u32` ids are what make `roaring::RoaringBitmap` posting lists
/// viable (§5 of SPEC_FULL.md).
pub type InternalId = u32;

/// The external id-allocation collaborator. The directory holds this by
/// shared reference (never by owning it — see SPEC_FULL.md §6), so it never
/// mutates the store itself; only `intern` is a mutating operation, and it
/// is always called by the caller before the directory's `insert`.
pub trait InternalIdStore {
    /// Allocate (or return the existing) internal id for `doc_id`.
    fn intern(&mut self, doc_id: DocumentId) -> InternalId;

    /// Look up the internal id for a previously interned document.
    fn get_internal_document_id(&self, doc_id: &DocumentId) -> Option<InternalId>;
}

/// A minimal, monotonically increasing id store, used by this crate's own
/// tests and doc examples. Not part of the indexing core's public contract.
#[derive(Debug, Default)]
pub struct SequentialIdStore {
    next: InternalId,
    forward: HashMap<DocumentId, InternalId>,
}

impl SequentialIdStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InternalIdStore for SequentialIdStore {
    fn intern(&mut self, doc_id: DocumentId) -> InternalId {
        if let Some(&id) = self.forward.get(&doc_id) {
            return id;
        }
        let id = self.next;
        self.next += 1;
        self.forward.insert(doc_id, id);
        id
    }

    fn get_internal_document_id(&self, doc_id: &DocumentId) -> Option<InternalId> {
        self.forward.get(doc_id).copied()
    }
}
