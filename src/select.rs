// src/select.rs
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::core::{ImageRef, ReferenceCollection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("cannot pick from an empty collection")]
    EmptyCollection,
}

/// Uniform pick using the thread-local RNG.
pub fn pick(images: &ReferenceCollection) -> Result<&ImageRef, SelectError> {
    pick_with(images, &mut rand::thread_rng())
}

/// Uniform pick with a caller-supplied RNG (seeded in tests).
pub fn pick_with<'a, R: Rng + ?Sized>(
    images: &'a ReferenceCollection,
    rng: &mut R,
) -> Result<&'a ImageRef, SelectError> {
    images.as_slice().choose(rng).ok_or(SelectError::EmptyCollection)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn coll(v: &[&str]) -> ReferenceCollection {
        v.iter().copied().map(ImageRef::from).collect()
    }

    #[test]
    fn single_element_always_returned() {
        let c = coll(&["only"]);
        for _ in 0..20 {
            assert_eq!(pick(&c).unwrap().as_str(), "only");
        }
    }

    #[test]
    fn empty_collection_fails() {
        assert_eq!(pick(&ReferenceCollection::new()), Err(SelectError::EmptyCollection));
    }

    #[test]
    fn every_element_reachable() {
        let c = coll(&["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut hits: HashMap<&str, usize> = HashMap::new();
        for _ in 0..4_000 {
            *hits.entry(pick_with(&c, &mut rng).unwrap().as_str()).or_default() += 1;
        }
        assert_eq!(hits.len(), 4);
        // loose uniformity check: each bucket near 1000
        assert!(hits.values().all(|&n| (800..1200).contains(&n)), "{hits:?}");
    }
}
