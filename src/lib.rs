//! facetdex: the indexing core of a schema-driven, in-memory full-text and
//! structured search engine.
//!
//! A declarative [`schema::Schema`] maps property paths to searchable
//! types; [`directory::IndexDirectory`] walks that schema to allocate one
//! specialized sub-index per property — a radix trie for text, a
//! self-balancing numeric tree, a flat set index for enums and booleans, a
//! block K-D tree for geopoints — and dispatches `insert`/`remove` to the
//! owning sub-index. [`query::QueryPlanner`] fans tokenized text search and
//! where-clause filters out across those sub-indexes and combines their
//! results.
//!
//! The document store, tokenizer/language pipeline, and cosine-similarity
//! ranker are named collaborators this crate depends on but does not
//! implement; see [`id::InternalIdStore`] and [`tokenizer::Tokenizer`].

pub mod config;
pub mod directory;
pub mod error;
pub mod geo;
pub mod id;
pub mod index;
pub mod query;
pub mod schema;
pub mod tokenizer;

pub use config::{DirectoryConfig, InsertOptions};
pub use directory::{DirectoryRecord, DirectorySnapshot, IndexDirectory, Value};
pub use error::{FacetError, Result};
pub use id::{DocumentId, InternalId, InternalIdStore, SequentialIdStore};
pub use query::{AvlPredicate, BkdPredicate, FlatPredicate, Predicate, QueryPlanner, RadixPredicate};
pub use schema::{Schema, SchemaField, SearchableType};
pub use tokenizer::{Tokenizer, WhitespaceTokenizer};
