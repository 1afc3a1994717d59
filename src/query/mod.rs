//! Query evaluation: tokenized text search and where-clause filtering.

pub mod planner;

pub use planner::{AvlPredicate, BkdPredicate, FlatPredicate, Predicate, QueryPlanner, RadixPredicate};
