//! BoolIndex: two posting buckets, keyed by `true` and `false`

use crate::id::InternalId;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BoolIndex {
    true_set: RoaringBitmap,
    false_set: RoaringBitmap,
    is_array: bool,
}

impl BoolIndex {
    pub fn new(is_array: bool) -> Self {
        Self {
            true_set: RoaringBitmap::new(),
            false_set: RoaringBitmap::new(),
            is_array,
        }
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn insert(&mut self, id: InternalId, value: bool) {
        if value {
            self.true_set.insert(id);
        } else {
            self.false_set.insert(id);
        }
    }

    pub fn where_value(&self, value: bool) -> RoaringBitmap {
        if value {
            self.true_set.clone()
        } else {
            self.false_set.clone()
        }
    }

    pub fn remove_document(&mut self, id: InternalId, value: bool) {
        if value {
            self.true_set.remove(id);
        } else {
            self.false_set.remove(id);
        }
    }
}
