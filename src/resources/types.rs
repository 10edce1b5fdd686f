/*!
 * Resource Types
 * The configured, ordered set of resource types and its validated identifiers
 */

use super::vector::ResourceVector;
use crate::core::errors::ConfigError;
use crate::core::types::Amount;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Index of a resource type inside a [`ResourceTypes`] set
///
/// Only handed out by the owning set, so indexing a vector of matching
/// dimension with it never goes out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(pub(super) usize);

impl ResourceId {
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Ordered set of resource type names
///
/// Cheap to clone; every engine and descriptor built from the same config
/// shares one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypes {
    names: Arc<[String]>,
}

impl ResourceTypes {
    /// Build a type set, rejecting empty and duplicate names
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ConfigError::NoResourceTypes);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateResourceType(name.clone()));
            }
        }

        Ok(Self {
            names: names.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Look up a type by name
    pub fn id(&self, name: &str) -> Option<ResourceId> {
        self.names.iter().position(|n| n == name).map(ResourceId)
    }

    pub fn name(&self, id: ResourceId) -> &str {
        &self.names[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        (0..self.names.len()).map(ResourceId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (ResourceId(i), name.as_str()))
    }

    /// All-zero vector of this set's dimension
    pub fn zeros(&self) -> ResourceVector {
        ResourceVector::zeros(self.len())
    }

    /// Convert a sparse name→amount map; missing types are zero
    pub fn vector_from_map(
        &self,
        map: &BTreeMap<String, Amount>,
        context: &str,
    ) -> Result<ResourceVector, ConfigError> {
        let mut vector = self.zeros();
        for (name, amount) in map {
            let id = self.id(name).ok_or_else(|| ConfigError::UnknownResourceType {
                context: context.to_string(),
                name: name.clone(),
            })?;
            vector[id] = *amount;
        }
        Ok(vector)
    }

    /// Convert a map that must name exactly the configured types
    pub fn complete_vector_from_map(
        &self,
        map: &BTreeMap<String, Amount>,
        context: &str,
    ) -> Result<ResourceVector, ConfigError> {
        if let Some((_, missing)) = self.iter().find(|(_, name)| !map.contains_key(*name)) {
            return Err(ConfigError::MissingResourceType {
                context: context.to_string(),
                name: missing.to_string(),
            });
        }
        self.vector_from_map(map, context)
    }

    /// Name-keyed view of a vector, for snapshots and log output
    pub fn to_map(&self, vector: &ResourceVector) -> BTreeMap<String, Amount> {
        self.iter()
            .map(|(id, name)| (name.to_string(), vector.get(id)))
            .collect()
    }

    /// Names of the given ids
    pub fn names_of<'a>(&'a self, ids: impl IntoIterator<Item = &'a ResourceId>) -> Vec<String> {
        ids.into_iter().map(|id| self.name(*id).to_string()).collect()
    }

    /// Render a vector with type names, e.g. `{A: 1, B: 0}`
    pub fn display<'a>(&'a self, vector: &'a ResourceVector) -> NamedVector<'a> {
        NamedVector {
            types: self,
            vector,
        }
    }
}

/// Display adapter pairing a vector with its type names
pub struct NamedVector<'a> {
    types: &'a ResourceTypes,
    vector: &'a ResourceVector,
}

impl fmt::Display for NamedVector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (id, name)) in self.types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, self.vector.get(id))?;
        }
        write!(f, "}}")
    }
}
