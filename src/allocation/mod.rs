pub mod types;
pub mod pattern;
pub mod queue;
pub mod allocator;
pub mod summary;

pub use types::{
    pairs_from_roster, room_desks, AllocationNotice, AllocationResult, BranchSummary, Candidate, CandidatePair, Desk,
    RollBranch, RoomDescriptor, RoomResult, SeatSlot, Series, Side, MAX_ROOM_DESKS,
};
pub use pattern::{pattern_capacity, seat_slots, Pattern};
pub use queue::{flatten_pairs, CohortShuffleQueue, PairQueue, QueueBuilder};
pub use allocator::{allocate, allocate_queue, allocate_with};
pub use summary::{room_summaries, room_summary, unallocated_report, BranchCount, RoomSummary, UnallocatedEntry};
