use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::allocation::{
    room_summary, unallocated_report, AllocationNotice, AllocationResult, Candidate, RoomResult,
};
use crate::error::Result;

const EMPTY_SEAT: &str = "[EMPTY]";

/// Formats one seat as "roll branch", or a placeholder when vacant
pub fn format_seat(candidate: Option<&Candidate>) -> String {
    match candidate {
        Some(c) => {
            let rb = c.roll_branch();
            if rb.branch.is_empty() {
                rb.roll
            } else {
                format!("{} {}", rb.roll, rb.branch)
            }
        }
        None => EMPTY_SEAT.to_string(),
    }
}

pub fn format_notice(notice: &AllocationNotice) -> String {
    match notice {
        AllocationNotice::InvalidRoomGeometry { room, rows, cols } => {
            format!("Room {} skipped: invalid geometry {}x{}", room, rows, cols)
        }
        AllocationNotice::UnknownPattern { name } => {
            format!("Unknown pattern '{}', standard order used", name)
        }
        AllocationNotice::DuplicateRoom { room } => {
            format!("Room {} listed twice, second entry left empty", room)
        }
    }
}

/// Printable page for one room: header, desk grid and branch table
pub struct RoomPlan<'a>(pub &'a RoomResult);

impl fmt::Display for RoomPlan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let room = self.0;
        let summary = room_summary(room);

        writeln!(f, "{}", room.room.college.to_uppercase())?;
        writeln!(f, "{}", room.room.exam)?;
        writeln!(f, "Seating Plan")?;
        writeln!(f, "{}    Total Students: {}", room.room.name, summary.total_students)?;
        writeln!(f, "↑ ↑ ↑ ↑ ↑ ↑ Black Board ↑ ↑ ↑ ↑ ↑ ↑")?;

        let cells: Vec<Vec<String>> = room
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|desk| format!("{} | {}", format_seat(desk.left.as_ref()), format_seat(desk.right.as_ref())))
                    .collect()
            })
            .collect();
        let width = cells.iter().flatten().map(|c| c.chars().count()).max().unwrap_or(0);

        for (r, row) in cells.iter().enumerate() {
            let line: Vec<String> = row.iter().map(|c| format!("[{:<width$}]", c, width = width)).collect();
            writeln!(f, "Row {:>2}: {}", r + 1, line.join(" "))?;
        }

        writeln!(f)?;
        writeln!(f, "{:<24} No. of Students", "Branch Name")?;
        for b in &summary.branches {
            let label = if b.branch.is_empty() { "(none)" } else { b.branch.as_str() };
            writeln!(f, "{:<24} {}", label, b.count)?;
        }
        Ok(())
    }
}

/// The whole allocation: every room, then notices and the unallocated list
pub struct AllocationPlan<'a>(pub &'a AllocationResult);

impl fmt::Display for AllocationPlan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        writeln!(f, "** Seating allocation ({} pattern) **", result.pattern)?;

        for room in &result.rooms {
            writeln!(f)?;
            write!(f, "{}", RoomPlan(room))?;
        }

        if !result.notices.is_empty() {
            writeln!(f)?;
            writeln!(f, "Notices:")?;
            for notice in &result.notices {
                writeln!(f, "  - {}", format_notice(notice))?;
            }
        }

        let unallocated = unallocated_report(result);
        if !unallocated.is_empty() {
            writeln!(f)?;
            writeln!(f, "Unallocated candidates ({}):", unallocated.len())?;
            for entry in &unallocated {
                writeln!(
                    f,
                    "  - {} {} ({}, row {})",
                    entry.roll,
                    entry.branch,
                    entry.origin.label(),
                    entry.source_id.saturating_add(1)
                )?;
            }
        }
        Ok(())
    }
}

pub fn render_room(room: &RoomResult) -> String {
    RoomPlan(room).to_string()
}

pub fn render_allocation(result: &AllocationResult) -> String {
    AllocationPlan(result).to_string()
}

/// Writes the rendered allocation to a text file
pub fn write_allocation_to_file<P: AsRef<Path>>(result: &AllocationResult, filename: P) -> Result<()> {
    let mut file = File::create(filename)?;
    file.write_all(render_allocation(result).as_bytes())?;
    Ok(())
}

/// Prints the allocation with a short header
pub fn print_allocation(result: &AllocationResult) {
    println!("\n=== Seating Allocation ===");
    println!(
        "Seated {} of {} candidates across {} rooms",
        result.total_assigned(),
        result.total_candidates(),
        result.rooms.len()
    );
    if !result.unallocated.is_empty() {
        println!("⚠️  Unallocated candidates: {}", result.unallocated.len());
    }
    println!("{}", render_allocation(result));
}
