use csv::{ReaderBuilder, StringRecord};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::allocation::{room_desks, CandidatePair, RoomDescriptor};
use crate::config::RoomDefaults;
use crate::error::{Result, SeatingError};

/// Roll-list pairs and room table read from one sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatingInput {
    pub students: Vec<CandidatePair>,
    pub rooms: Vec<RoomDescriptor>,
}

/// Column positions found in the header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    series_1: usize,
    series_2: usize,
    room: usize,
    rows: Option<usize>,
    cols: Option<usize>,
    college: Option<usize>,
    exam: Option<usize>,
}

impl ColumnMap {
    fn detect(headers: &StringRecord) -> Result<Self> {
        // lowercased, trimmed header -> position; first occurrence wins
        let mut header_map: HashMap<String, usize> = HashMap::new();
        for (idx, h) in headers.iter().enumerate() {
            let key = h.trim().to_lowercase();
            if !key.is_empty() {
                header_map.entry(key).or_insert(idx);
            }
        }

        let series_1 = find_column(&header_map, &["roll no. series-1", "roll no series-1"]);
        let series_2 = find_column(&header_map, &["roll no. series-2", "roll no series-2"]);
        let (series_1, series_2) = match (series_1, series_2) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(SeatingError::MissingColumn("roll series")),
        };
        let room = find_column(&header_map, &["room no.", "room no", "room"]).ok_or(SeatingError::MissingColumn("room no."))?;

        Ok(ColumnMap {
            series_1,
            series_2,
            room,
            rows: find_column(&header_map, &["row", "rows"]),
            cols: find_column(&header_map, &["column", "columns", "cols"]),
            college: find_column(&header_map, &["college name", "college"]),
            exam: find_column(&header_map, &["exam name", "exam"]),
        })
    }
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn cell(record: &StringRecord, col: usize) -> &str {
    record.get(col).unwrap_or("").trim()
}

/// Parses a desk count; only finite, non-zero numbers count. Fractions are floored.
fn parse_count(value: &str) -> Option<i64> {
    let n: f64 = value.trim().parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    let floored = n.floor() as i64;
    if floored == 0 {
        None
    } else {
        Some(floored)
    }
}

/// Rejects a room whose desk grid overflows or exceeds `max_desks`. Non-positive sides pass;
/// the allocator reports those as a notice.
pub fn ensure_room_fits(room: &RoomDescriptor, max_desks: usize) -> Result<()> {
    if room.rows <= 0 || room.cols <= 0 {
        return Ok(());
    }
    match room_desks(room.rows, room.cols) {
        Some(n) if n <= max_desks => Ok(()),
        _ => Err(SeatingError::InvalidRequest(format!(
            "room {} is too large ({}x{} desks, limit {})",
            room.name, room.rows, room.cols, max_desks
        ))),
    }
}

/// Reads a seating sheet from any CSV source.
///
/// Every data row with a value in either roll series column becomes a pair. A row also
/// declares a room when it has a room name, numeric row and column counts, and the name
/// was not seen before. Missing college/exam cells fall back to `defaults`. A room larger
/// than `max_room_desks` fails the whole sheet.
pub fn parse_seating_input<R: Read>(
    source: R,
    defaults: &RoomDefaults,
    max_room_desks: usize,
) -> Result<SeatingInput> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(source);
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::detect(&headers)?;

    let mut students = Vec::new();
    let mut rooms = Vec::new();
    let mut seen_rooms: HashSet<String> = HashSet::new();

    for result in reader.records() {
        let record = result?;

        let v1 = cell(&record, columns.series_1);
        let v2 = cell(&record, columns.series_2);
        if !v1.is_empty() || !v2.is_empty() {
            let id = students.len() as u64;
            students.push(CandidatePair::new(v1, v2, id));
        }

        let name = cell(&record, columns.room);
        let rows = columns.rows.and_then(|c| parse_count(cell(&record, c)));
        let cols = columns.cols.and_then(|c| parse_count(cell(&record, c)));
        if let (false, Some(rows), Some(cols)) = (name.is_empty(), rows, cols) {
            if seen_rooms.insert(name.to_string()) {
                let college = columns
                    .college
                    .map(|c| cell(&record, c).to_string())
                    .unwrap_or_else(|| defaults.college.clone());
                let exam = columns
                    .exam
                    .map(|c| cell(&record, c).to_string())
                    .unwrap_or_else(|| defaults.exam.clone());
                let room = RoomDescriptor {
                    name: name.to_string(),
                    rows,
                    cols,
                    college,
                    exam,
                };
                ensure_room_fits(&room, max_room_desks)?;
                rooms.push(room);
            }
        }
    }

    if rooms.is_empty() {
        return Err(SeatingError::NoRooms);
    }

    log::info!("Parsed {} roll rows and {} rooms", students.len(), rooms.len());
    Ok(SeatingInput { students, rooms })
}

/// Loads a seating sheet from a CSV file
pub fn load_seating_input<P: AsRef<Path>>(
    csv_path: P,
    defaults: &RoomDefaults,
    max_room_desks: usize,
) -> Result<SeatingInput> {
    let file = std::fs::File::open(csv_path)?;
    parse_seating_input(file, defaults, max_room_desks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::MAX_ROOM_DESKS;

    fn parse(sheet: &str, defaults: &RoomDefaults) -> Result<SeatingInput> {
        parse_seating_input(sheet.as_bytes(), defaults, MAX_ROOM_DESKS)
    }

    const SHEET: &str = "\
Roll No. Series-1,Roll No. Series-2,Room No.,Row,Column,College Name,Exam Name
21CSE001 CSE,21ECE001 ECE,R101,2,3,City College,Mid Term
21CSE002 CSE,21ECE002 ECE,R102,1,2,City College,Mid Term
21CSE003 CSE,,R101,4,4,City College,Mid Term
,21ECE004 ECE,,,,,
,,R103,x,2,,
";

    #[test]
    fn test_parse_pairs_and_rooms() {
        let input = parse(SHEET, &RoomDefaults::default()).unwrap();
        assert_eq!(input.students.len(), 4);
        assert_eq!(input.students[0], CandidatePair::new("21CSE001 CSE", "21ECE001 ECE", 0));
        assert_eq!(input.students[2].s2.as_deref(), Some(""));
        assert_eq!(input.students[3].id, 3);

        // R101 appears twice, R103 has a non-numeric row count
        assert_eq!(input.rooms.len(), 2);
        assert_eq!(input.rooms[0].name, "R101");
        assert_eq!((input.rooms[0].rows, input.rooms[0].cols), (2, 3));
        assert_eq!(input.rooms[1].college, "City College");
        assert_eq!(input.rooms[1].exam, "Mid Term");
    }

    #[test]
    fn test_alternate_headers_and_defaults() {
        let sheet = "roll no series-1,ROLL NO SERIES-2,room,rows,cols\nA1 IT,B1 IT,Lab,2.7,3\n";
        let defaults = RoomDefaults { college: "Default U".into(), exam: "Finals".into() };
        let input = parse(sheet, &defaults).unwrap();
        assert_eq!(input.rooms.len(), 1);
        assert_eq!(input.rooms[0].rows, 2);
        assert_eq!(input.rooms[0].college, "Default U");
        assert_eq!(input.rooms[0].exam, "Finals");
    }

    #[test]
    fn test_missing_series_column() {
        let sheet = "Roll No. Series-1,Room No.,Row,Column\nA1,R1,1,1\n";
        let err = parse(sheet, &RoomDefaults::default()).unwrap_err();
        assert!(matches!(err, SeatingError::MissingColumn(_)));
    }

    #[test]
    fn test_no_rooms_is_an_error() {
        let sheet = "Roll No. Series-1,Roll No. Series-2,Room No.\nA1,B1,R1\n";
        let err = parse(sheet, &RoomDefaults::default()).unwrap_err();
        assert!(matches!(err, SeatingError::NoRooms));
    }

    #[test]
    fn test_negative_counts_pass_through() {
        let sheet = "Roll No. Series-1,Roll No. Series-2,Room No.,Row,Column\nA1,B1,R1,-2,3\n";
        let input = parse(sheet, &RoomDefaults::default()).unwrap();
        assert_eq!(input.rooms[0].rows, -2);
    }

    #[test]
    fn test_oversized_room_rejects_sheet() {
        let sheet = "Roll No. Series-1,Roll No. Series-2,Room No.,Row,Column\nA1,B1,Hall,4294967296,4294967296\n";
        let err = parse(sheet, &RoomDefaults::default()).unwrap_err();
        assert!(matches!(err, SeatingError::InvalidRequest(_)));

        let sheet = "Roll No. Series-1,Roll No. Series-2,Room No.,Row,Column\nA1,B1,R1,5,5\n";
        let err = parse_seating_input(sheet.as_bytes(), &RoomDefaults::default(), 20).unwrap_err();
        assert!(err.to_string().contains("limit 20"));
        assert!(parse_seating_input(sheet.as_bytes(), &RoomDefaults::default(), 25).is_ok());
    }
}
