use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::allocation::{
    allocate_with, pairs_from_roster, room_summaries, unallocated_report, AllocationResult, CandidatePair,
    CohortShuffleQueue, PairQueue, Pattern, RoomDescriptor, RoomSummary, UnallocatedEntry,
};
use crate::error::{Result, SeatingError};
use crate::parser::ensure_room_fits;

/// How the candidate queue is built before seating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Pairs,
    CohortShuffle,
}

/// Allocation request from a frontend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocationRequest {
    #[serde(default)]
    pub students: Vec<CandidatePair>,
    /// Flat list of values, appended after `students`
    #[serde(default)]
    pub roster: Vec<String>,
    pub rooms: Vec<RoomDescriptor>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub strategy: Strategy,
    /// Seed for the cohort shuffle; a fresh random seed is used when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl AllocationRequest {
    /// All candidate pairs, roster entries numbered after the highest pair id
    pub fn candidate_pairs(&self) -> Result<Vec<CandidatePair>> {
        let mut pairs = self.students.clone();
        if self.roster.is_empty() {
            return Ok(pairs);
        }
        let first_free = pairs.iter().map(|p| p.id).max().map_or(Some(0), |max| max.checked_add(1));
        let next_id = first_free
            .filter(|id| id.checked_add(self.roster.len() as u64 - 1).is_some())
            .ok_or_else(|| SeatingError::InvalidRequest("student ids leave no room for the roster".to_string()))?;
        pairs.extend(pairs_from_roster(&self.roster, next_id));
        Ok(pairs)
    }
}

/// Rejects requests the allocator cannot meaningfully run on. Repeated room names are
/// left to the allocator, which reports them as a notice.
pub fn validate_request(req: &AllocationRequest, max_room_desks: usize) -> Result<()> {
    if req.rooms.is_empty() {
        return Err(SeatingError::InvalidRequest("at least one room is required".to_string()));
    }

    for room in &req.rooms {
        if room.name.trim().is_empty() {
            return Err(SeatingError::InvalidRequest("room name is required".to_string()));
        }
        ensure_room_fits(room, max_room_desks)?;
    }

    let mut ids = HashSet::new();
    for pair in &req.students {
        if !ids.insert(pair.id) {
            return Err(SeatingError::InvalidRequest(format!("student id {} is not unique", pair.id)));
        }
    }

    req.candidate_pairs()?;
    Ok(())
}

/// Runs the allocation a request describes; `default_pattern` applies when it names none
pub fn run_request(req: &AllocationRequest, default_pattern: Pattern) -> Result<AllocationResult> {
    let pairs = req.candidate_pairs()?;
    let pattern = req.pattern.clone().unwrap_or_else(|| default_pattern.name().to_string());
    Ok(run_with_strategy(&pairs, &req.rooms, &pattern, req.strategy, req.seed))
}

pub fn run_with_strategy(
    pairs: &[CandidatePair],
    rooms: &[RoomDescriptor],
    pattern: &str,
    strategy: Strategy,
    seed: Option<u64>,
) -> AllocationResult {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    match strategy {
        Strategy::Pairs => allocate_with(&mut PairQueue, pairs, rooms, pattern),
        Strategy::CohortShuffle => {
            let rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            allocate_with(&mut CohortShuffleQueue::new(rng), pairs, rooms, pattern)
        }
    }
}

/// Response body for an allocation
#[derive(Debug, Serialize)]
pub struct AllocationResponse {
    pub success: bool,
    pub result: AllocationResult,
    pub summaries: Vec<RoomSummary>,
    pub unallocated: Vec<UnallocatedEntry>,
}

impl From<AllocationResult> for AllocationResponse {
    fn from(result: AllocationResult) -> Self {
        AllocationResponse {
            success: true,
            summaries: room_summaries(&result),
            unallocated: unallocated_report(&result),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{AllocationNotice, MAX_ROOM_DESKS};

    fn request_json(body: &str) -> AllocationRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_request_with_pairs_and_roster() {
        let req = request_json(
            r#"{
                "students": [{"s1": "A1 CSE", "s2": "B1 ECE", "id": 4}],
                "roster": ["C1 ME", "C2 ME"],
                "rooms": [{"name": "R1", "rows": 1, "cols": 2}],
                "pattern": "snake"
            }"#,
        );
        assert!(validate_request(&req, MAX_ROOM_DESKS).is_ok());
        let pairs = req.candidate_pairs().unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1].id, 5);
        assert_eq!(pairs[2].id, 6);

        let result = run_request(&req, Pattern::Standard).unwrap();
        assert_eq!(result.pattern, Pattern::Snake);
        assert_eq!(result.total_assigned(), 4);
    }

    #[test]
    fn test_default_pattern_applies() {
        let req = request_json(r#"{"roster": ["A1"], "rooms": [{"name": "R1", "rows": 1, "cols": 1}]}"#);
        let result = run_request(&req, Pattern::Single).unwrap();
        assert_eq!(result.pattern, Pattern::Single);
    }

    #[test]
    fn test_validation_errors() {
        let no_rooms = request_json(r#"{"rooms": []}"#);
        assert!(matches!(validate_request(&no_rooms, MAX_ROOM_DESKS), Err(SeatingError::InvalidRequest(_))));

        let ids = request_json(
            r#"{"students": [{"s1": "A", "id": 1}, {"s1": "B", "id": 1}],
                "rooms": [{"name": "R1", "rows": 1, "cols": 1}]}"#,
        );
        assert!(validate_request(&ids, MAX_ROOM_DESKS).is_err());
    }

    #[test]
    fn test_huge_room_is_rejected() {
        let req = request_json(r#"{"roster": ["A1"], "rooms": [{"name": "R", "rows": 4294967296, "cols": 4294967296}]}"#);
        assert!(matches!(validate_request(&req, MAX_ROOM_DESKS), Err(SeatingError::InvalidRequest(_))));

        let req = request_json(r#"{"roster": ["A1"], "rooms": [{"name": "R", "rows": 10, "cols": 10}]}"#);
        assert!(validate_request(&req, 99).is_err());
        assert!(validate_request(&req, 100).is_ok());

        // zero-sized rooms stay a notice, not an error
        let req = request_json(r#"{"roster": ["A1"], "rooms": [{"name": "R", "rows": 0, "cols": 10}]}"#);
        assert!(validate_request(&req, MAX_ROOM_DESKS).is_ok());
    }

    #[test]
    fn test_max_student_id_leaves_no_roster_ids() {
        let req = request_json(
            r#"{"students": [{"s1": "A CSE", "id": 18446744073709551615}],
                "roster": ["B CSE"],
                "rooms": [{"name": "R1", "rows": 1, "cols": 1}]}"#,
        );
        assert!(matches!(validate_request(&req, MAX_ROOM_DESKS), Err(SeatingError::InvalidRequest(_))));
        assert!(run_request(&req, Pattern::Standard).is_err());

        let req = request_json(
            r#"{"students": [{"s1": "A CSE", "id": 18446744073709551614}],
                "roster": ["B CSE"],
                "rooms": [{"name": "R1", "rows": 1, "cols": 1}]}"#,
        );
        let pairs = req.candidate_pairs().unwrap();
        assert_eq!(pairs[1].id, u64::MAX);

        // without a roster the largest id is fine
        let req = request_json(
            r#"{"students": [{"s1": "A CSE", "id": 18446744073709551615}],
                "rooms": [{"name": "R1", "rows": 1, "cols": 1}]}"#,
        );
        assert_eq!(run_request(&req, Pattern::Standard).unwrap().total_assigned(), 1);
    }

    #[test]
    fn test_repeated_room_is_a_notice() {
        let req = request_json(
            r#"{"roster": ["A1 CSE", "A2 CSE", "A3 CSE"],
                "rooms": [{"name": "R1", "rows": 1, "cols": 1}, {"name": "R1", "rows": 2, "cols": 2}]}"#,
        );
        assert!(validate_request(&req, MAX_ROOM_DESKS).is_ok());
        let result = run_request(&req, Pattern::Standard).unwrap();
        assert_eq!(result.notices, vec![AllocationNotice::DuplicateRoom { room: "R1".into() }]);
        assert_eq!(result.unallocated.len(), 1);
    }

    #[test]
    fn test_seeded_shuffle_is_stable() {
        let req = request_json(
            r#"{"roster": ["1 CSE", "2 CSE", "3 CSE", "4 IT", "5 IT", "6 CSE"],
                "rooms": [{"name": "R1", "rows": 3, "cols": 1}],
                "strategy": "cohort-shuffle", "seed": 99}"#,
        );
        let a = run_request(&req, Pattern::Standard).unwrap();
        let b = run_request(&req, Pattern::Standard).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rooms[0].summary.get("CSE"), Some(&4));
    }

    #[test]
    fn test_response_projection() {
        let req = request_json(r#"{"roster": ["1 CSE", "2 IT", "3 IT"], "rooms": [{"name": "R1", "rows": 1, "cols": 1}]}"#);
        let response = AllocationResponse::from(run_request(&req, Pattern::Standard).unwrap());
        assert_eq!(response.summaries[0].total_students, 2);
        assert_eq!(response.unallocated.len(), 1);
        assert_eq!(response.unallocated[0].roll, "3");
    }
}
