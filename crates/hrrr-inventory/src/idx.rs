//! Parser for wgrib2-style `.idx` sidecar files.
//!
//! Each line describes one GRIB2 message:
//!
//! ```text
//! 1:0:d=2024050112:REFC:entire atmosphere:5 hour fcst:
//! 2:381172:d=2024050112:RETOP:cloud top:5 hour fcst:
//! ```
//!
//! Fields are row number, start byte, reference time, variable, level and
//! forecast time. The end of a message is the start of the next one, so the
//! last record's length is unknown unless the GRIB2 file size is supplied.

use hrrr_common::{HrrrError, HrrrResult};
use serde::{Deserialize, Serialize};

/// Minimum number of fields on an index line.
const INDEX_FIELD_COUNT: usize = 6;

/// One message listed in an index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// 1-based message number
    pub row_number: u32,
    /// Offset of the message's first byte in the GRIB2 file
    pub byte_offset: u64,
    /// Raw reference time token (e.g. `d=2024050112`)
    pub reference_time: String,
    pub variable: String,
    pub level: String,
    pub forecast_time: String,
    /// `None` for the last message when the file size is not known
    pub byte_length: Option<u64>,
}

/// Parse index content, leaving the last record's length unknown.
pub fn parse_index(content: &str) -> HrrrResult<Vec<IndexRecord>> {
    parse_index_with_size(content, None)
}

/// Parse index content. When `total_size` (the GRIB2 file size in bytes) is
/// given, it closes the final record's byte range.
///
/// Errors report the 1-based line of the offending record in `content`.
pub fn parse_index_with_size(content: &str, total_size: Option<u64>) -> HrrrResult<Vec<IndexRecord>> {
    // (source line, record)
    let mut lines: Vec<(usize, IndexRecord)> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        lines.push((idx + 1, parse_line(idx + 1, line)?));
    }

    lines.sort_by_key(|(_, r)| r.row_number);

    for pair in lines.windows(2) {
        let ((_, prev), (line, next)) = (&pair[0], &pair[1]);
        if prev.row_number == next.row_number {
            return Err(HrrrError::MalformedIndex {
                line: *line,
                message: format!("duplicate row number {}", next.row_number),
            });
        }
        if next.byte_offset < prev.byte_offset {
            return Err(HrrrError::MalformedIndex {
                line: *line,
                message: format!(
                    "row {} starts at byte {} before row {} at byte {}",
                    next.row_number, next.byte_offset, prev.row_number, prev.byte_offset
                ),
            });
        }
    }

    let last_line = lines.last().map(|(line, _)| *line);
    let mut records: Vec<IndexRecord> = lines.into_iter().map(|(_, r)| r).collect();

    let offsets: Vec<u64> = records.iter().map(|r| r.byte_offset).collect();
    for (i, record) in records.iter_mut().enumerate() {
        record.byte_length = offsets.get(i + 1).map(|next| next - record.byte_offset);
    }

    if let (Some(total), Some(last), Some(line)) = (total_size, records.last_mut(), last_line) {
        if total < last.byte_offset {
            return Err(HrrrError::MalformedIndex {
                line,
                message: format!(
                    "file size {} is smaller than the last message offset {}",
                    total, last.byte_offset
                ),
            });
        }
        last.byte_length = Some(total - last.byte_offset);
    }

    Ok(records)
}

fn parse_line(line_no: usize, line: &str) -> HrrrResult<IndexRecord> {
    let delimiter = if line.contains(':') { ':' } else { ',' };
    let fields: Vec<&str> = line.trim_end().split(delimiter).collect();

    if fields.len() < INDEX_FIELD_COUNT {
        return Err(HrrrError::MalformedIndex {
            line: line_no,
            message: format!(
                "expected at least {} '{}'-separated fields, found {}",
                INDEX_FIELD_COUNT,
                delimiter,
                fields.len()
            ),
        });
    }

    let row_number = fields[0]
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| HrrrError::MalformedIndex {
            line: line_no,
            message: format!("row number '{}' is not a positive integer", fields[0]),
        })?;

    let byte_offset = fields[1]
        .trim()
        .parse::<u64>()
        .map_err(|_| HrrrError::MalformedIndex {
            line: line_no,
            message: format!("byte offset '{}' is not a non-negative integer", fields[1]),
        })?;

    Ok(IndexRecord {
        row_number,
        byte_offset,
        reference_time: fields[2].trim().to_string(),
        variable: fields[3].trim().to_string(),
        level: fields[4].trim().to_string(),
        forecast_time: fields[5].trim().to_string(),
        byte_length: None,
    })
}
