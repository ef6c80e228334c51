use serde::{Serialize, Deserialize};

use super::types::{AllocationResult, RollBranch, RoomResult, Series};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCount {
    pub branch: String,
    pub count: usize,
}

/// Per-room occupancy, ready for a layout footer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub name: String,
    pub college: String,
    pub exam: String,
    pub total_students: usize,
    pub branches: Vec<BranchCount>,
}

/// An unseated candidate split for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnallocatedEntry {
    pub roll: String,
    pub branch: String,
    pub origin: Series,
    pub source_id: u64,
}

pub fn room_summary(room: &RoomResult) -> RoomSummary {
    RoomSummary {
        name: room.room.name.clone(),
        college: room.room.college.clone(),
        exam: room.room.exam.clone(),
        total_students: room.assigned_count,
        branches: room
            .summary
            .iter()
            .map(|(branch, &count)| BranchCount { branch: branch.clone(), count })
            .collect(),
    }
}

pub fn room_summaries(result: &AllocationResult) -> Vec<RoomSummary> {
    result.rooms.iter().map(room_summary).collect()
}

/// Unseated candidates in queue order
pub fn unallocated_report(result: &AllocationResult) -> Vec<UnallocatedEntry> {
    result
        .unallocated
        .iter()
        .map(|c| {
            let RollBranch { roll, branch } = c.roll_branch();
            UnallocatedEntry {
                roll,
                branch,
                origin: c.origin,
                source_id: c.source_id,
            }
        })
        .collect()
}
