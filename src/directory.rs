//! IndexDirectory: schema-driven construction, dispatch, and (de)serialization
//!
//! One [`Tree`] or [`VectorStore`] per leaf property path, built eagerly by
//! walking a [`Schema`]. `insert`/`remove` dispatch to the owning sub-index
//! by property; nothing here ever replaces a sub-index in place except
//! [`IndexDirectory::load`], which rebuilds the whole directory from a
//! prior [`IndexDirectory::save`].

use crate::config::{DirectoryConfig, InsertOptions};
use crate::error::{FacetError, Result};
use crate::geo::GeoPoint;
use crate::id::{DocumentId, InternalId, InternalIdStore};
use crate::index::avl::AVLIndex;
use crate::index::bkd::BKDIndex;
use crate::index::bool_index::BoolIndex;
use crate::index::flat::FlatIndex;
use crate::index::radix::RadixIndex;
use crate::index::vector::VectorStore;
use crate::index::Tree;
use crate::schema::{Schema, SearchableType};
use crate::tokenizer::Tokenizer;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A value being ingested for one property, tagged by the same shape as
/// its declared [`SearchableType`]. [`IndexDirectory::insert`] rejects any
/// combination that does not match the property's sub-index kind.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    TextArray(Vec<String>),
    Number(f64),
    NumberArray(Vec<f64>),
    Boolean(bool),
    BooleanArray(Vec<bool>),
    Enum(String),
    EnumArray(Vec<String>),
    GeoPoint(GeoPoint),
    Vector(Vec<f32>),
}

/// An indexed leaf property: either a posting-backed [`Tree`] or a
/// [`VectorStore`], at a fixed position in schema-walk order.
#[derive(Serialize, Deserialize)]
pub(crate) enum Slot {
    Tree(Tree),
    Vector(VectorStore),
}

/// Owns one sub-index per property path named by a [`Schema`], and a
/// non-owning handle to the external id store (never shared ownership —
/// modeled with a lifetime, per the design notes).
pub struct IndexDirectory<'a> {
    config: DirectoryConfig,
    id_store: &'a dyn InternalIdStore,
    slots: Vec<(String, Slot)>,
    slot_index: AHashMap<String, usize>,
    searchable_properties: Vec<String>,
    searchable_properties_with_types: AHashMap<String, SearchableType>,
    /// The most recent `docs_count` an `insert` call was told about — the
    /// running total document count `QueryPlanner::search`'s IDF
    /// computation reads (spec.md §6: `insert`'s `docsCount` argument,
    /// `search` takes none of its own).
    total_docs: u32,
}

impl<'a> IndexDirectory<'a> {
    /// Walks `schema` depth-first, allocating one sub-index per leaf
    /// property. Unknown types cannot occur (the type set is closed), but
    /// a zero-dimension vector is rejected by the walk itself.
    pub fn create(schema: &Schema, id_store: &'a dyn InternalIdStore, config: DirectoryConfig) -> Result<Self> {
        let walked = schema.walk()?;
        let mut slots = Vec::with_capacity(walked.len());
        let mut slot_index = AHashMap::default();
        let mut searchable_properties = Vec::with_capacity(walked.len());
        let mut searchable_properties_with_types = AHashMap::default();

        for (path, ty) in walked {
            let slot = match ty {
                SearchableType::String | SearchableType::StringArray => {
                    Slot::Tree(Tree::Radix(RadixIndex::new(ty.is_array())))
                }
                SearchableType::Number | SearchableType::NumberArray => {
                    Slot::Tree(Tree::Avl(AVLIndex::new(ty.is_array())))
                }
                SearchableType::Boolean | SearchableType::BooleanArray => {
                    Slot::Tree(Tree::Bool(BoolIndex::new(ty.is_array())))
                }
                SearchableType::Enum | SearchableType::EnumArray => {
                    Slot::Tree(Tree::Flat(FlatIndex::new(ty.is_array())))
                }
                SearchableType::GeoPoint => {
                    Slot::Tree(Tree::Bkd(BKDIndex::new(false, config.bkd_overflow_threshold)))
                }
                SearchableType::Vector(size) => Slot::Vector(VectorStore::new(size)),
            };

            slot_index.insert(path.clone(), slots.len());
            slots.push((path.clone(), slot));
            searchable_properties_with_types.insert(path.clone(), ty);
            searchable_properties.push(path);
        }

        Ok(Self {
            config,
            id_store,
            slots,
            slot_index,
            searchable_properties,
            searchable_properties_with_types,
            total_docs: 0,
        })
    }

    pub fn searchable_properties(&self) -> &[String] {
        &self.searchable_properties
    }

    pub fn searchable_properties_with_types(&self) -> &AHashMap<String, SearchableType> {
        &self.searchable_properties_with_types
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// The running total document count, last reported by an `insert`
    /// call's `docs_count` argument. `QueryPlanner::search` reads this for
    /// its IDF computation rather than taking it from its own caller.
    pub fn total_docs(&self) -> u32 {
        self.total_docs
    }

    pub fn id_store(&self) -> &dyn InternalIdStore {
        self.id_store
    }

    fn slot_mut(&mut self, property: &str) -> Option<&mut Slot> {
        let idx = *self.slot_index.get(property)?;
        Some(&mut self.slots[idx].1)
    }

    pub(crate) fn slot(&self, property: &str) -> Option<&Slot> {
        let idx = *self.slot_index.get(property)?;
        Some(&self.slots[idx].1)
    }

    /// Dispatches `value` to the sub-index owning `property`, expanding
    /// array values into one posting per element (invariant 5: each array
    /// element is a distinct posting under the same internal id).
    ///
    /// `docs_count` is the caller's current total document count; it
    /// replaces whatever this directory previously recorded (see
    /// `total_docs`), which is what `QueryPlanner::search`'s IDF
    /// computation reads.
    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &mut self,
        property: &str,
        external_id: DocumentId,
        internal_id: InternalId,
        value: Value,
        language: Option<&str>,
        tokenizer: &dyn Tokenizer,
        docs_count: u32,
        options: InsertOptions,
    ) -> Result<()> {
        self.total_docs = docs_count;
        let avl_threshold = options.resolve_avl_threshold(&self.config);
        let slot = self
            .slot_mut(property)
            .ok_or_else(|| FacetError::InvalidSchemaType {
                property: property.to_string(),
                reason: "no sub-index allocated for this property".into(),
            })?;

        match (slot, value) {
            (Slot::Tree(Tree::Radix(idx)), Value::Text(text)) => {
                idx.insert(&text, internal_id, tokenizer, language, Some(property));
            }
            (Slot::Tree(Tree::Radix(idx)), Value::TextArray(texts)) => {
                for text in texts {
                    idx.insert(&text, internal_id, tokenizer, language, Some(property));
                }
            }
            (Slot::Tree(Tree::Avl(idx)), Value::Number(n)) => {
                idx.insert(n, internal_id, avl_threshold);
            }
            (Slot::Tree(Tree::Avl(idx)), Value::NumberArray(ns)) => {
                for n in ns {
                    idx.insert(n, internal_id, avl_threshold);
                }
            }
            (Slot::Tree(Tree::Bool(idx)), Value::Boolean(b)) => {
                idx.insert(internal_id, b);
            }
            (Slot::Tree(Tree::Bool(idx)), Value::BooleanArray(bs)) => {
                for b in bs {
                    idx.insert(internal_id, b);
                }
            }
            (Slot::Tree(Tree::Flat(idx)), Value::Enum(key)) => {
                idx.insert(&key, internal_id);
            }
            (Slot::Tree(Tree::Flat(idx)), Value::EnumArray(keys)) => {
                for key in keys {
                    idx.insert(&key, internal_id);
                }
            }
            (Slot::Tree(Tree::Bkd(idx)), Value::GeoPoint(point)) => {
                idx.insert(point, internal_id);
            }
            (Slot::Vector(store), Value::Vector(values)) => {
                store.insert(property, external_id, values.into_iter().map(|v| v as f64))?;
            }
            _ => {
                return Err(FacetError::InvalidSchemaType {
                    property: property.to_string(),
                    reason: "value does not match this property's declared type".into(),
                });
            }
        }
        Ok(())
    }

    /// Removes `value` for `internal_id`/`external_id` at `property`.
    /// Returns `true` when the deletion is immediately reflected in future
    /// queries; `false` only occurs for BKD removals that may need a later
    /// compaction (never interpret `false` as failure).
    pub fn remove(
        &mut self,
        property: &str,
        external_id: &DocumentId,
        value: Value,
        language: Option<&str>,
        tokenizer: &dyn Tokenizer,
    ) -> Result<bool> {
        let slot = self
            .slot_mut(property)
            .ok_or_else(|| FacetError::InvalidSchemaType {
                property: property.to_string(),
                reason: "no sub-index allocated for this property".into(),
            })?;

        let Some(internal_id) = self.id_store.get_internal_document_id(external_id) else {
            return Ok(true);
        };

        let affected = match (slot, value) {
            (Slot::Tree(Tree::Radix(idx)), Value::Text(text)) => {
                for token in tokenizer.tokenize(&text, language, Some(property)) {
                    idx.remove_document_by_word(&token, internal_id);
                }
                true
            }
            (Slot::Tree(Tree::Radix(idx)), Value::TextArray(texts)) => {
                for text in texts {
                    for token in tokenizer.tokenize(&text, language, Some(property)) {
                        idx.remove_document_by_word(&token, internal_id);
                    }
                }
                true
            }
            (Slot::Tree(Tree::Avl(idx)), Value::Number(n)) => {
                idx.remove_document(internal_id, n);
                true
            }
            (Slot::Tree(Tree::Avl(idx)), Value::NumberArray(ns)) => {
                for n in ns {
                    idx.remove_document(internal_id, n);
                }
                true
            }
            (Slot::Tree(Tree::Bool(idx)), Value::Boolean(b)) => {
                idx.remove_document(internal_id, b);
                true
            }
            (Slot::Tree(Tree::Bool(idx)), Value::BooleanArray(bs)) => {
                for b in bs {
                    idx.remove_document(internal_id, b);
                }
                true
            }
            (Slot::Tree(Tree::Flat(idx)), Value::Enum(key)) => {
                idx.remove_document(internal_id, &key);
                true
            }
            (Slot::Tree(Tree::Flat(idx)), Value::EnumArray(keys)) => {
                for key in keys {
                    idx.remove_document(internal_id, &key);
                }
                true
            }
            (Slot::Tree(Tree::Bkd(idx)), Value::GeoPoint(point)) => {
                idx.remove_document(point, internal_id)
            }
            (Slot::Vector(store), Value::Vector(_)) => {
                store.remove(external_id);
                true
            }
            _ => {
                return Err(FacetError::InvalidSchemaType {
                    property: property.to_string(),
                    reason: "value does not match this property's declared type".into(),
                });
            }
        };
        Ok(affected)
    }

    /// A structurally serializable snapshot of this directory, borrowed —
    /// cloning the sub-indexes is unnecessary since `serde::Serialize`
    /// only ever needs `&self`. Byte-level transport (the wire or disk
    /// format) is left to the caller, per §1.
    pub fn save(&self) -> DirectorySnapshot<'_> {
        DirectorySnapshot {
            config: &self.config,
            slots: &self.slots,
            searchable_properties: &self.searchable_properties,
            searchable_properties_with_types: &self.searchable_properties_with_types,
            total_docs: self.total_docs,
        }
    }

    /// The exact inverse of `save`: reconstructs a directory from a
    /// previously deserialized [`DirectoryRecord`] and a (possibly
    /// different) id store handle.
    pub fn load(id_store: &'a dyn InternalIdStore, record: DirectoryRecord) -> Self {
        let slot_index = record
            .slots
            .iter()
            .enumerate()
            .map(|(i, (path, _))| (path.clone(), i))
            .collect();

        Self {
            config: record.config,
            id_store,
            slots: record.slots,
            slot_index,
            searchable_properties: record.searchable_properties,
            searchable_properties_with_types: record.searchable_properties_with_types,
            total_docs: record.total_docs,
        }
    }
}

/// Borrowed view produced by [`IndexDirectory::save`]; serialize it with
/// any `serde`-compatible format.
#[derive(Serialize)]
pub struct DirectorySnapshot<'d> {
    config: &'d DirectoryConfig,
    slots: &'d [(String, Slot)],
    searchable_properties: &'d [String],
    searchable_properties_with_types: &'d AHashMap<String, SearchableType>,
    total_docs: u32,
}

/// Owned counterpart deserialized from a snapshot, consumed by
/// [`IndexDirectory::load`].
#[derive(Deserialize)]
pub struct DirectoryRecord {
    config: DirectoryConfig,
    slots: Vec<(String, Slot)>,
    searchable_properties: Vec<String>,
    searchable_properties_with_types: AHashMap<String, SearchableType>,
    total_docs: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdStore;
    use crate::schema::Schema;
    use crate::tokenizer::WhitespaceTokenizer;

    #[test]
    fn create_allocates_one_sub_index_per_leaf() {
        let schema = Schema::new()
            .with_field("title", SearchableType::String)
            .with_field("age", SearchableType::Number)
            .with_field("active", SearchableType::Boolean)
            .with_field("color", SearchableType::Enum)
            .with_field("loc", SearchableType::GeoPoint)
            .with_field("embedding", SearchableType::Vector(3));

        let store = SequentialIdStore::new();
        let dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

        assert_eq!(dir.searchable_properties().len(), 6);
        assert!(matches!(
            dir.slot("title").unwrap(),
            Slot::Tree(Tree::Radix(_))
        ));
        assert!(matches!(dir.slot("embedding").unwrap(), Slot::Vector(_)));
    }

    #[test]
    fn insert_then_remove_is_symmetric_for_a_scalar_number() {
        let schema = Schema::new().with_field("age", SearchableType::Number);
        let mut store = SequentialIdStore::new();
        let id = store.intern(DocumentId::from("doc-1"));
        let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

        dir.insert(
            "age",
            DocumentId::from("doc-1"),
            id,
            Value::Number(30.0),
            None,
            &WhitespaceTokenizer,
            1,
            InsertOptions::default(),
        )
        .unwrap();

        if let Slot::Tree(Tree::Avl(avl)) = dir.slot("age").unwrap() {
            assert_eq!(avl.find(30.0), Some(&[0u32][..]));
        } else {
            panic!("expected an AVL slot");
        }

        dir.remove(
            "age",
            &DocumentId::from("doc-1"),
            Value::Number(30.0),
            None,
            &WhitespaceTokenizer,
        )
        .unwrap();

        if let Slot::Tree(Tree::Avl(avl)) = dir.slot("age").unwrap() {
            assert_eq!(avl.find(30.0), Some(&[][..]));
        } else {
            panic!("expected an AVL slot");
        }
    }

    #[test]
    fn mismatched_value_type_is_an_error() {
        let schema = Schema::new().with_field("age", SearchableType::Number);
        let mut store = SequentialIdStore::new();
        let id = store.intern(DocumentId::from("doc-1"));
        let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

        let err = dir
            .insert(
                "age",
                DocumentId::from("doc-1"),
                id,
                Value::Text("thirty".into()),
                None,
                &WhitespaceTokenizer,
                1,
                InsertOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_SCHEMA_TYPE");
    }

    #[test]
    fn remove_rejects_an_unknown_property_regardless_of_the_id() {
        let schema = Schema::new().with_field("age", SearchableType::Number);
        let store = SequentialIdStore::new();
        let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

        // An id the store has never seen must not mask a bad property name.
        let err = dir
            .remove(
                "nonexistent",
                &DocumentId::from("doc-1"),
                Value::Number(30.0),
                None,
                &WhitespaceTokenizer,
            )
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_SCHEMA_TYPE");
    }

    #[test]
    fn remove_of_an_unknown_id_on_a_real_property_is_a_no_op() {
        let schema = Schema::new().with_field("age", SearchableType::Number);
        let store = SequentialIdStore::new();
        let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

        let removed = dir
            .remove(
                "age",
                &DocumentId::from("doc-1"),
                Value::Number(30.0),
                None,
                &WhitespaceTokenizer,
            )
            .unwrap();
        assert!(removed);
    }

    #[test]
    fn save_then_load_round_trips_postings() {
        let schema = Schema::new()
            .with_field("title", SearchableType::String)
            .with_field("age", SearchableType::Number);
        let mut store = SequentialIdStore::new();
        let mut dir = IndexDirectory::create(&schema, &store, DirectoryConfig::default()).unwrap();

        let id = store.intern(DocumentId::from("doc-1"));
        dir.insert(
            "title",
            DocumentId::from("doc-1"),
            id,
            Value::Text("hello world".into()),
            None,
            &WhitespaceTokenizer,
            1,
            InsertOptions::default(),
        )
        .unwrap();
        dir.insert(
            "age",
            DocumentId::from("doc-1"),
            id,
            Value::Number(30.0),
            None,
            &WhitespaceTokenizer,
            1,
            InsertOptions::default(),
        )
        .unwrap();

        let json = serde_json::to_string(&dir.save()).unwrap();
        let record: DirectoryRecord = serde_json::from_str(&json).unwrap();
        let reloaded = IndexDirectory::load(&store, record);

        assert_eq!(reloaded.searchable_properties(), dir.searchable_properties());
        assert_eq!(reloaded.total_docs(), dir.total_docs());
        if let Slot::Tree(Tree::Avl(avl)) = reloaded.slot("age").unwrap() {
            assert_eq!(avl.find(30.0), Some(&[0u32][..]));
        } else {
            panic!("expected an AVL slot");
        }
        if let Slot::Tree(Tree::Radix(radix)) = reloaded.slot("title").unwrap() {
            assert_eq!(radix.find("hello", true, 0)[0].1.get(&0), Some(&1));
        } else {
            panic!("expected a Radix slot");
        }
    }
}
