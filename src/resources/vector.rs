/*!
 * Resource Vectors
 * Dense per-type amounts indexed by validated resource ids
 */

use super::types::ResourceId;
use crate::core::types::Amount;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One amount per configured resource type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector(Vec<Amount>);

impl ResourceVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, id: ResourceId) -> Amount {
        self.0[id.index()]
    }

    pub fn as_slice(&self) -> &[Amount] {
        &self.0
    }

    /// True when every entry is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&a| a == 0)
    }

    /// Element-wise `self <= other`
    pub fn covered_by(&self, other: &ResourceVector) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a <= b)
    }

    /// Element-wise sum, `None` on overflow or dimension mismatch
    pub fn checked_add(&self, other: &ResourceVector) -> Option<ResourceVector> {
        if self.0.len() != other.0.len() {
            return None;
        }
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.checked_add(*b))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Element-wise difference, `None` if any entry would go negative
    pub fn checked_sub(&self, other: &ResourceVector) -> Option<ResourceVector> {
        if self.0.len() != other.0.len() {
            return None;
        }
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.checked_sub(*b))
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    /// Add `other` in place, saturating; callers validate bounds first
    pub fn saturating_add_assign(&mut self, other: &ResourceVector) {
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a = a.saturating_add(*b);
        }
    }

    /// Ids with a non-zero entry
    pub fn nonzero_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, a)| **a > 0)
            .map(|(i, _)| ResourceId(i))
    }
}

impl From<Vec<Amount>> for ResourceVector {
    fn from(values: Vec<Amount>) -> Self {
        Self(values)
    }
}

impl Index<ResourceId> for ResourceVector {
    type Output = Amount;

    fn index(&self, id: ResourceId) -> &Amount {
        &self.0[id.index()]
    }
}

impl IndexMut<ResourceId> for ResourceVector {
    fn index_mut(&mut self, id: ResourceId) -> &mut Amount {
        &mut self.0[id.index()]
    }
}
