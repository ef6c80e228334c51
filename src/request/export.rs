use csv::Writer;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::allocation::{AllocationResult, Side};
use crate::error::Result;

/// Room column value used for candidates left without a seat
pub const UNALLOCATED_ROOM: &str = "UNALLOCATED";

/// One line of the seat list. Rows and columns are 1-based; unseated rows leave them blank.
#[derive(Debug, Serialize)]
struct SeatRecord<'a> {
    room: &'a str,
    row: Option<usize>,
    column: Option<usize>,
    side: Option<Side>,
    roll: String,
    branch: String,
    series: &'static str,
    source_id: u64,
}

/// Writes every occupied seat, room by room in row-major order, followed by the
/// unallocated candidates
pub fn export_allocation<W: Write>(result: &AllocationResult, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    for room in &result.rooms {
        for (row, col, side, candidate) in room.seated() {
            let rb = candidate.roll_branch();
            wtr.serialize(SeatRecord {
                room: &room.room.name,
                row: Some(row + 1),
                column: Some(col + 1),
                side: Some(side),
                roll: rb.roll,
                branch: rb.branch,
                series: candidate.origin.label(),
                source_id: candidate.source_id,
            })?;
        }
    }

    for candidate in &result.unallocated {
        let rb = candidate.roll_branch();
        wtr.serialize(SeatRecord {
            room: UNALLOCATED_ROOM,
            row: None,
            column: None,
            side: None,
            roll: rb.roll,
            branch: rb.branch,
            series: candidate.origin.label(),
            source_id: candidate.source_id,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the seat list to a CSV file, replacing any existing file
pub fn export_allocation_to_csv<P: AsRef<Path>>(result: &AllocationResult, csv_path: P) -> Result<()> {
    let file = std::fs::File::create(csv_path)?;
    export_allocation(result, file)
}

/// Exports the seat list into memory
pub fn export_allocation_to_string(result: &AllocationResult) -> Result<String> {
    let mut buffer = Vec::new();
    export_allocation(result, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{allocate, CandidatePair, RoomDescriptor};

    #[test]
    fn test_export_lists_seats_then_overflow() {
        let pairs = vec![
            CandidatePair::new("1 CSE", "2 ECE", 0),
            CandidatePair::new("3 CSE", "", 1),
        ];
        let rooms = vec![RoomDescriptor::new("R1", 1, 1)];
        let result = allocate(&pairs, &rooms, "standard");
        let csv = export_allocation_to_string(&result).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "room,row,column,side,roll,branch,series,source_id");
        assert_eq!(lines[1], "R1,1,1,left,1,CSE,series-1,0");
        assert_eq!(lines[2], "R1,1,1,right,2,ECE,series-2,0");
        assert_eq!(lines[3], "UNALLOCATED,,,,3,CSE,series-1,1");
        assert_eq!(lines.len(), 4);
    }
}
