//! FlatIndex: scalar or array key to posting-set membership (enum/bool)
//!
//! A direct `key -> posting set` map; no tree structure is needed because
//! enum values have no natural ordering worth exploiting. `is_array`
//! determines which filter operator family is valid (§4.3).

use crate::error::{FacetError, Result};
use crate::id::InternalId;
use ahash::AHashMap;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

/// A scalar filter operator: exactly one variant is ever populated at a
/// time, enforced by [`FlatIndex::filter`]'s caller contract.
#[derive(Debug, Clone)]
pub enum FlatOp {
    Eq(String),
    In(Vec<String>),
    Nin(Vec<String>),
}

/// An array filter operator (`is_array` properties only).
#[derive(Debug, Clone)]
pub enum FlatArrayOp {
    ContainsAll(Vec<String>),
}

/// `key -> posting set`, for enum and boolean-as-string scalar/array
/// properties.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FlatIndex {
    postings: AHashMap<String, RoaringBitmap>,
    is_array: bool,
}

impl FlatIndex {
    pub fn new(is_array: bool) -> Self {
        Self {
            postings: AHashMap::default(),
            is_array,
        }
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn insert(&mut self, key: &str, id: InternalId) {
        self.postings.entry(key.to_string()).or_default().insert(id);
    }

    pub fn remove_document(&mut self, id: InternalId, key: &str) {
        if let Some(set) = self.postings.get_mut(key) {
            set.remove(id);
            if set.is_empty() {
                self.postings.remove(key);
            }
        }
    }

    fn posting_set(&self, key: &str) -> RoaringBitmap {
        self.postings.get(key).cloned().unwrap_or_default()
    }

    pub fn filter(&self, property: &str, op: &FlatOp) -> Result<RoaringBitmap> {
        Ok(match op {
            FlatOp::Eq(key) => self.posting_set(key),
            FlatOp::In(keys) => {
                let mut out = RoaringBitmap::new();
                for key in keys {
                    out |= self.posting_set(key);
                }
                out
            }
            FlatOp::Nin(keys) => {
                let excluded: RoaringBitmap = keys.iter().fold(RoaringBitmap::new(), |acc, key| {
                    acc | self.posting_set(key)
                });
                let mut all = RoaringBitmap::new();
                for set in self.postings.values() {
                    all |= set;
                }
                let _ = property;
                all - excluded
            }
        })
    }

    pub fn filter_arr(&self, property: &str, op: &FlatArrayOp) -> Result<RoaringBitmap> {
        match op {
            FlatArrayOp::ContainsAll(keys) => {
                if !self.is_array {
                    return Err(FacetError::InvalidFilterOperation {
                        property: property.to_string(),
                        reason: "containsAll requires an array-valued property".into(),
                    });
                }
                let mut iter = keys.iter();
                let Some(first) = iter.next() else {
                    return Ok(RoaringBitmap::new());
                };
                let mut out = self.posting_set(first);
                for key in iter {
                    out &= self.posting_set(key);
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_returns_matching_posting_set() {
        let mut idx = FlatIndex::new(false);
        idx.insert("red", 1);
        idx.insert("red", 2);
        idx.insert("blue", 3);

        let result = idx.filter("color", &FlatOp::Eq("red".into())).unwrap();
        assert_eq!(result, RoaringBitmap::from_iter([1, 2]));
    }

    #[test]
    fn in_unions_posting_sets() {
        let mut idx = FlatIndex::new(false);
        idx.insert("red", 1);
        idx.insert("blue", 2);
        idx.insert("green", 3);

        let result = idx
            .filter("color", &FlatOp::In(vec!["red".into(), "blue".into()]))
            .unwrap();
        assert_eq!(result, RoaringBitmap::from_iter([1, 2]));
    }

    #[test]
    fn nin_excludes_posting_sets() {
        let mut idx = FlatIndex::new(false);
        idx.insert("red", 1);
        idx.insert("blue", 2);
        idx.insert("green", 3);

        let result = idx.filter("color", &FlatOp::Nin(vec!["red".into()])).unwrap();
        assert_eq!(result, RoaringBitmap::from_iter([2, 3]));
    }

    #[test]
    fn contains_all_requires_array_variant() {
        let mut idx = FlatIndex::new(true);
        idx.insert("a", 1);
        idx.insert("b", 1);
        idx.insert("a", 2);

        let result = idx
            .filter_arr("tags", &FlatArrayOp::ContainsAll(vec!["a".into(), "b".into()]))
            .unwrap();
        assert_eq!(result, RoaringBitmap::from_iter([1]));

        let mut scalar = FlatIndex::new(false);
        scalar.insert("a", 1);
        let err = scalar
            .filter_arr("tags", &FlatArrayOp::ContainsAll(vec!["a".into()]))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_FILTER_OPERATION");
    }

    #[test]
    fn remove_document_drops_empty_keys() {
        let mut idx = FlatIndex::new(false);
        idx.insert("red", 1);
        idx.remove_document(1, "red");
        assert_eq!(idx.filter("color", &FlatOp::Eq("red".into())).unwrap().len(), 0);
        assert!(!idx.postings.contains_key("red"));
    }
}
