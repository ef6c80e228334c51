use std::collections::{HashSet, VecDeque};

use super::pattern::{seat_slots, Pattern};
use super::queue::{PairQueue, QueueBuilder};
use super::types::{
    AllocationNotice, AllocationResult, BranchSummary, Candidate, CandidatePair, Desk, RoomDescriptor,
    RoomResult, SeatSlot, Side,
};

/// Seats candidates from the deterministic pairs queue.
///
/// Rooms are filled in the order given, each following `pattern`'s traversal. Whatever
/// does not fit ends up in `unallocated`, in queue order. Unknown pattern names fall
/// back to [`Pattern::Standard`].
pub fn allocate(pairs: &[CandidatePair], rooms: &[RoomDescriptor], pattern: &str) -> AllocationResult {
    allocate_with(&mut PairQueue, pairs, rooms, pattern)
}

/// Same as [`allocate`] but with any queue builder, e.g. the cohort shuffle
pub fn allocate_with<Q: QueueBuilder>(
    builder: &mut Q,
    pairs: &[CandidatePair],
    rooms: &[RoomDescriptor],
    pattern: &str,
) -> AllocationResult {
    let mut notices = Vec::new();
    let resolved = match Pattern::from_name(pattern) {
        Some(p) => p,
        None => {
            log::warn!("Unknown seating pattern '{}', using standard", pattern);
            notices.push(AllocationNotice::UnknownPattern { name: pattern.to_string() });
            Pattern::Standard
        }
    };

    let queue = builder.build(pairs);
    let mut result = allocate_queue(queue, rooms, resolved);
    notices.append(&mut result.notices);
    result.notices = notices;
    result
}

/// Runs the allocation over an already-built queue
pub fn allocate_queue(queue: Vec<Candidate>, rooms: &[RoomDescriptor], pattern: Pattern) -> AllocationResult {
    let mut queue: VecDeque<Candidate> = queue.into();
    let mut notices = Vec::new();
    let mut seen_rooms: HashSet<&str> = HashSet::new();
    let mut results = Vec::with_capacity(rooms.len());

    for room in rooms {
        let duplicate = !seen_rooms.insert(room.name.as_str());
        if duplicate {
            log::warn!("Room '{}' listed more than once, later entry left empty", room.name);
            notices.push(AllocationNotice::DuplicateRoom { room: room.name.clone() });
        } else if !room.has_valid_geometry() {
            log::warn!("Room '{}' has unusable geometry {}x{}", room.name, room.rows, room.cols);
            notices.push(AllocationNotice::InvalidRoomGeometry {
                room: room.name.clone(),
                rows: room.rows,
                cols: room.cols,
            });
        }

        let room_result = if duplicate {
            empty_room(room, 0, 0)
        } else {
            fill_room(room, pattern, &mut queue)
        };
        log::debug!(
            "Room '{}': seated {} ({} still queued)",
            room.name,
            room_result.assigned_count,
            queue.len()
        );
        results.push(room_result);
    }

    if !queue.is_empty() {
        log::info!("{} candidates could not be seated", queue.len());
    }

    AllocationResult {
        pattern,
        rooms: results,
        unallocated: queue.into_iter().collect(),
        notices,
    }
}

fn empty_room(room: &RoomDescriptor, rows: usize, cols: usize) -> RoomResult {
    RoomResult {
        room: room.clone(),
        grid: vec![vec![Desk::empty(); cols]; rows],
        assigned_count: 0,
        summary: BranchSummary::new(),
    }
}

/// Walks the room's slots, building each visited desk whole from the front of the queue
fn fill_room(room: &RoomDescriptor, pattern: Pattern, queue: &mut VecDeque<Candidate>) -> RoomResult {
    let (rows, cols) = room.dimensions();
    let mut result = empty_room(room, rows, cols);

    for slot in seat_slots(room.rows, room.cols, pattern) {
        if queue.is_empty() {
            break;
        }
        let desk = take_desk(&slot, queue);
        for (_, candidate) in desk.occupants() {
            result.assigned_count += 1;
            *result.summary.entry(candidate.branch()).or_insert(0) += 1;
        }
        result.grid[slot.row][slot.col] = desk;
    }

    result
}

fn take_desk(slot: &SeatSlot, queue: &mut VecDeque<Candidate>) -> Desk {
    match (slot.side, slot.capacity) {
        (Some(Side::Left), _) => Desk::new(queue.pop_front(), None),
        (Some(Side::Right), _) => Desk::new(None, queue.pop_front()),
        (None, 2) => {
            let left = queue.pop_front();
            let right = queue.pop_front();
            Desk::new(left, right)
        }
        (None, _) => Desk::new(queue.pop_front(), None),
    }
}
