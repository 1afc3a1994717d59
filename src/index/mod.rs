//! The polymorphic sub-index layer: one tagged variant per searchable type
//! family, dispatched on by [`crate::directory::IndexDirectory`].

pub mod avl;
pub mod bkd;
pub mod bool_index;
pub mod flat;
pub mod radix;
pub mod vector;

use avl::AVLIndex;
use bkd::BKDIndex;
use bool_index::BoolIndex;
use flat::FlatIndex;
use radix::RadixIndex;
use serde::{Deserialize, Serialize};

/// A tagged union over the five posting-backed sub-index kinds. Replaces
/// an inheritance hierarchy: every operation on a property's sub-index
/// pattern-matches on this tag rather than dispatching virtually. Serde's
/// externally-tagged enum representation gives each variant its type tag as
/// its discriminant on the wire, matching the persisted-layout contract.
#[derive(Serialize, Deserialize)]
pub enum Tree {
    Radix(RadixIndex),
    Avl(AVLIndex),
    Flat(FlatIndex),
    Bkd(BKDIndex),
    Bool(BoolIndex),
}

impl Tree {
    pub fn is_array(&self) -> bool {
        match self {
            Tree::Radix(t) => t.is_array(),
            Tree::Avl(t) => t.is_array(),
            Tree::Flat(t) => t.is_array(),
            Tree::Bkd(t) => t.is_array(),
            Tree::Bool(t) => t.is_array(),
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            Tree::Radix(_) => "radix",
            Tree::Avl(_) => "avl",
            Tree::Flat(_) => "flat",
            Tree::Bkd(_) => "bkd",
            Tree::Bool(_) => "bool",
        }
    }
}
