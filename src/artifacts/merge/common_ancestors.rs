//! Common ancestor discovery over the commit graph
//!
//! A best common ancestor of `X` and `Y` is a commit reachable from both that is not itself
//! an ancestor of another such commit. Criss-cross histories can have several; the merge
//! base is then the one with the smallest object id, so the choice is deterministic.
//!
//! The finder only needs a way to load a commit's parents, which keeps it independent of
//! how commits are stored.

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::debug;

pub struct AncestorFinder<F>
where
    F: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    load_parents: F,
}

impl<F> AncestorFinder<F>
where
    F: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(load_parents: F) -> Self {
        Self { load_parents }
    }

    /// Every commit reachable from `start`, `start` included.
    pub fn ancestors(&self, start: &ObjectId) -> anyhow::Result<HashSet<ObjectId>> {
        let mut visited = HashSet::from([start.clone()]);
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(oid) = queue.pop_front() {
            for parent in (self.load_parents)(&oid)? {
                if visited.insert(parent.clone()) {
                    queue.push_back(parent);
                }
            }
        }

        Ok(visited)
    }

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor).
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        let mut visited = HashSet::from([descendant.clone()]);
        let mut queue = VecDeque::from([descendant.clone()]);

        while let Some(oid) = queue.pop_front() {
            if &oid == ancestor {
                return Ok(true);
            }
            for parent in (self.load_parents)(&oid)? {
                if visited.insert(parent.clone()) {
                    queue.push_back(parent);
                }
            }
        }

        Ok(false)
    }

    pub fn common_ancestors(
        &self,
        a: &ObjectId,
        b: &ObjectId,
    ) -> anyhow::Result<BTreeSet<ObjectId>> {
        let from_a = self.ancestors(a)?;
        let from_b = self.ancestors(b)?;

        Ok(from_a.intersection(&from_b).cloned().collect())
    }

    /// Common ancestors that are not ancestors of another common ancestor.
    pub fn best_common_ancestors(
        &self,
        a: &ObjectId,
        b: &ObjectId,
    ) -> anyhow::Result<BTreeSet<ObjectId>> {
        let candidates = self.common_ancestors(a, b)?;
        let mut redundant = HashSet::new();

        for candidate in &candidates {
            if redundant.contains(candidate) {
                continue;
            }
            let below = self.ancestors(candidate)?;
            redundant.extend(
                below
                    .into_iter()
                    .filter(|oid| oid != candidate && candidates.contains(oid)),
            );
        }

        let best = candidates
            .into_iter()
            .filter(|oid| !redundant.contains(oid))
            .collect::<BTreeSet<_>>();

        debug!(
            receiver = %a.to_short_oid(),
            giver = %b.to_short_oid(),
            count = best.len(),
            "found best common ancestors"
        );

        Ok(best)
    }

    pub fn best_common_ancestor(
        &self,
        a: &ObjectId,
        b: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        Ok(self.best_common_ancestors(a, b)?.into_iter().next())
    }
}
