use std::collections::HashMap;
use rand::Rng;
use rand::seq::SliceRandom;

use super::types::{Candidate, CandidatePair, Series};

/// Turns roll-list pairs into the ordered queue the allocator consumes
pub trait QueueBuilder {
    fn build(&mut self, pairs: &[CandidatePair]) -> Vec<Candidate>;
}

/// Keeps a value only if it has something besides whitespace
fn candidate_from(value: &Option<String>, origin: Series, source_id: u64) -> Option<Candidate> {
    let trimmed = value.as_deref().map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return None;
    }
    Some(Candidate {
        value: trimmed.to_string(),
        origin,
        source_id,
    })
}

/// Flattens pairs in input order, `s1` before `s2`, dropping empty values
pub fn flatten_pairs(pairs: &[CandidatePair]) -> Vec<Candidate> {
    let mut queue = Vec::with_capacity(pairs.len() * 2);
    for pair in pairs {
        if let Some(c) = candidate_from(&pair.s1, Series::SeriesA, pair.id) {
            queue.push(c);
        }
        if let Some(c) = candidate_from(&pair.s2, Series::SeriesB, pair.id) {
            queue.push(c);
        }
    }
    let dropped = pairs.len() * 2 - queue.len();
    if dropped > 0 {
        log::debug!("Dropped {} empty roll values while building the queue", dropped);
    }
    queue
}

/// The deterministic raw-pairs queue: no reordering at all
#[derive(Debug, Clone, Copy, Default)]
pub struct PairQueue;

impl QueueBuilder for PairQueue {
    fn build(&mut self, pairs: &[CandidatePair]) -> Vec<Candidate> {
        flatten_pairs(pairs)
    }
}

/// Groups candidates by branch (groups in order of first appearance), shuffles inside
/// each group with the supplied random source and concatenates the groups.
#[derive(Debug, Clone)]
pub struct CohortShuffleQueue<R: Rng> {
    rng: R,
}

impl<R: Rng> CohortShuffleQueue<R> {
    pub fn new(rng: R) -> Self {
        CohortShuffleQueue { rng }
    }
}

impl<R: Rng> QueueBuilder for CohortShuffleQueue<R> {
    fn build(&mut self, pairs: &[CandidatePair]) -> Vec<Candidate> {
        let mut groups: Vec<Vec<Candidate>> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();

        for candidate in flatten_pairs(pairs) {
            let key = candidate.branch();
            let idx = *group_index.entry(key).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[idx].push(candidate);
        }

        log::debug!("Shuffling {} cohort groups", groups.len());
        for group in &mut groups {
            group.shuffle(&mut self.rng);
        }
        groups.into_iter().flatten().collect()
    }
}
