//! QueryPlanner: tokenized multi-property text search and where-clause
//! evaluation over an [`IndexDirectory`]
//!
//! Two independent procedures, matching the facade's `search` and
//! `searchByWhereClause`: `search` fans a term out over selected radix
//! sub-indexes and merges per-property scores; `where_clause` evaluates one
//! predicate per property and intersects the resulting posting sets.

use crate::directory::{IndexDirectory, Slot};
use crate::error::{FacetError, Result};
use crate::geo::GeoPoint;
use crate::id::InternalId;
use crate::index::flat::{FlatArrayOp, FlatOp};
use crate::index::Tree;
use crate::tokenizer::Tokenizer;
use ahash::AHashMap;
use indexmap::IndexMap;
use roaring::RoaringBitmap;

/// A single where-clause predicate, shaped to match the sub-index kind it
/// targets. [`Predicate::Flat`] carries either a scalar or array operator —
/// which one is valid depends on the target property's `is_array` flag.
#[derive(Debug, Clone)]
pub enum Predicate {
    Bool(bool),
    /// One term, or an array of terms (each tokenized and unioned).
    Radix(RadixPredicate),
    Flat(FlatPredicate),
    Avl(AvlPredicate),
    Bkd(BkdPredicate),
}

#[derive(Debug, Clone)]
pub enum RadixPredicate {
    Term(String),
    Terms(Vec<String>),
}

#[derive(Debug, Clone)]
pub enum FlatPredicate {
    Scalar(FlatOp),
    Array(FlatArrayOp),
}

#[derive(Debug, Clone, Copy)]
pub enum AvlPredicate {
    Eq(f64),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
    Between(f64, f64),
}

#[derive(Debug, Clone)]
pub enum BkdPredicate {
    Radius {
        coordinates: GeoPoint,
        value: f64,
        unit: crate::geo::DistanceUnit,
        inside: bool,
        high_precision: bool,
    },
    Polygon {
        vertices: Vec<GeoPoint>,
        inside: bool,
    },
}

/// Fans a term out across selected radix properties and intersects/unions
/// posting sets for where-clause filters. Holds no state of its own — every
/// call takes the [`IndexDirectory`] it operates over.
pub struct QueryPlanner;

impl QueryPlanner {
    /// Tokenizes `term`; if tokenization yields nothing and `term` itself is
    /// empty, substitutes a single empty token (matches everything in each
    /// requested text property). Accumulates each property's contribution
    /// into a shared results map and returns it in insertion order —
    /// deliberately unsorted (see `DESIGN.md`'s open-question resolution).
    ///
    /// Reads the running total-document count from `directory.total_docs()`
    /// (set by `IndexDirectory::insert`'s `docs_count` argument) for its IDF
    /// computation, rather than taking it as a parameter here — matching the
    /// facade, which gives `docsCount` to `insert` and none to `search`.
    pub fn search(
        directory: &IndexDirectory,
        term: &str,
        tokenizer: &dyn Tokenizer,
        language: Option<&str>,
        properties: &[String],
        exact: bool,
        tolerance: usize,
        boost: &AHashMap<String, f32>,
    ) -> Result<Vec<(InternalId, f32)>> {
        let mut tokens = tokenizer.tokenize(term, language, None);
        if tokens.is_empty() && term.is_empty() {
            tokens.push(String::new());
        }

        let total_docs = directory.total_docs();
        // `IndexMap` preserves first-insertion order by construction, so the
        // order its keys iterate in after every property has contributed is
        // exactly the first-touched order across the whole call — no
        // separate bookkeeping needed.
        let mut results_map: IndexMap<InternalId, f32> = IndexMap::new();

        for property in properties {
            let Some(Slot::Tree(Tree::Radix(index))) = directory.slot(property) else {
                return Err(FacetError::WrongSearchPropertyType {
                    property: property.clone(),
                });
            };

            let property_boost = boost.get(property).copied().unwrap_or(directory.config().default_boost);
            if property_boost <= 0.0 {
                return Err(FacetError::InvalidBoostValue {
                    property: property.clone(),
                    value: property_boost,
                });
            }

            // Later tokens overwrite earlier ones on a duplicate word — the
            // planner treats the token list as an OR at the word level.
            let mut found_words = IndexMap::new();
            for token in &tokens {
                for (word, postings) in index.find(token, exact, tolerance) {
                    found_words.insert(word, postings);
                }
            }
            let found_words: Vec<_> = found_words.into_iter().collect();

            crate::index::radix::RadixIndex::calculate_score(
                &found_words,
                &mut results_map,
                property_boost,
                total_docs,
            );
        }

        Ok(results_map.into_iter().collect())
    }

    /// Evaluates one predicate per property and intersects the resulting
    /// posting sets (logical AND across properties).
    pub fn search_by_where_clause(
        directory: &IndexDirectory,
        filters: &[(String, Predicate)],
        tokenizer: &dyn Tokenizer,
        language: Option<&str>,
    ) -> Result<RoaringBitmap> {
        let mut per_property = Vec::with_capacity(filters.len());

        for (property, predicate) in filters {
            let slot = directory
                .slot(property)
                .ok_or_else(|| FacetError::UnknownFilterProperty(property.clone()))?;

            let postings = match (slot, predicate) {
                (Slot::Tree(Tree::Bool(index)), Predicate::Bool(value)) => index.where_value(*value),
                (Slot::Tree(Tree::Avl(index)), Predicate::Avl(pred)) => match *pred {
                    AvlPredicate::Eq(k) => index.find(k).map(|ids| ids.iter().copied().collect()).unwrap_or_default(),
                    AvlPredicate::Gt(k) => index.greater_than(k, false).into_iter().collect(),
                    AvlPredicate::Gte(k) => index.greater_than(k, true).into_iter().collect(),
                    AvlPredicate::Lt(k) => index.less_than(k, false).into_iter().collect(),
                    AvlPredicate::Lte(k) => index.less_than(k, true).into_iter().collect(),
                    AvlPredicate::Between(min, max) => index.range_search(min, max).into_iter().collect(),
                },
                (Slot::Tree(Tree::Flat(index)), Predicate::Flat(pred)) => match pred {
                    FlatPredicate::Scalar(op) => index.filter(property, op)?,
                    FlatPredicate::Array(op) => index.filter_arr(property, op)?,
                },
                (Slot::Tree(Tree::Radix(index)), Predicate::Radix(pred)) => {
                    let terms: Vec<String> = match pred {
                        RadixPredicate::Term(t) => vec![t.clone()],
                        RadixPredicate::Terms(ts) => ts.clone(),
                    };
                    let mut out = RoaringBitmap::new();
                    for term in terms {
                        for token in tokenizer.tokenize(&term, language, Some(property)) {
                            for (_, postings) in index.find(&token, true, 0) {
                                for id in postings.keys() {
                                    out.insert(*id);
                                }
                            }
                        }
                    }
                    out
                }
                (Slot::Tree(Tree::Bkd(index)), Predicate::Bkd(pred)) => match pred {
                    BkdPredicate::Radius {
                        coordinates,
                        value,
                        unit,
                        inside,
                        high_precision,
                    } => {
                        let meters = unit.to_meters(*value);
                        index.search_by_radius(*coordinates, meters, *inside, *high_precision)
                    }
                    BkdPredicate::Polygon { vertices, inside } => index.search_by_polygon(vertices, *inside),
                },
                _ => {
                    return Err(FacetError::InvalidFilterOperation {
                        property: property.clone(),
                        reason: "predicate shape does not match this property's sub-index".into(),
                    });
                }
            };

            per_property.push(postings);
        }

        // Smallest-first intersection: fewer comparisons than folding left
        // to right over arbitrarily ordered lists.
        per_property.sort_by_key(|set| set.len());
        let mut iter = per_property.into_iter();
        let Some(mut acc) = iter.next() else {
            return Ok(RoaringBitmap::new());
        };
        for set in iter {
            acc &= set;
        }
        Ok(acc)
    }
}
