/*!
 * Resources Module
 * Validated resource-type sets and dense per-type amount vectors
 */

mod types;
mod vector;

pub use types::{ResourceId, ResourceTypes};
pub use vector::ResourceVector;
