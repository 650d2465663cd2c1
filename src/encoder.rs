//! MBP CSV encoder.
//!
//! Writes a header, then one fixed-width row per [`MbpRecord`]:
//!
//! ```text
//! ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,depth,price,size,
//! flags,ts_in_delta,sequence,bid_px_00,bid_sz_00,bid_ct_00,...,ask_ct_NN,symbol
//! ```
//!
//! Every bid rank precedes every ask rank. Placeholder ranks render as an
//! empty price with size and count 0, and an unknown depth renders as `-1`.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{StringRecord, WriterBuilder};

use crate::error::Result;
use crate::reader::IO_BUFFER_SIZE;
use crate::snapshot::{LevelSnapshot, MbpRecord};
use crate::types::MBP10_RTYPE;

/// Columns before the level block.
const LEADING_COLUMNS: [&str; 13] = [
    "ts_recv",
    "ts_event",
    "rtype",
    "publisher_id",
    "instrument_id",
    "action",
    "side",
    "depth",
    "price",
    "size",
    "flags",
    "ts_in_delta",
    "sequence",
];

/// Header for a book of `levels` ranks per side.
pub fn header(levels: usize) -> Vec<String> {
    let mut columns: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    for prefix in ["bid", "ask"] {
        for i in 0..levels {
            columns.push(format!("{prefix}_px_{i:02}"));
            columns.push(format!("{prefix}_sz_{i:02}"));
            columns.push(format!("{prefix}_ct_{i:02}"));
        }
    }
    columns.push("symbol".to_string());
    columns
}

/// Streaming MBP row writer.
pub struct MbpWriter<W: Write> {
    writer: csv::Writer<W>,
    levels: usize,
    record_type: u8,
    record: StringRecord,
    scratch: String,
    rows_written: u64,
    header_written: bool,
}

impl MbpWriter<BufWriter<File>> {
    /// Create (truncate) `path` and write to it.
    pub fn from_path(path: impl AsRef<Path>, levels: usize) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(
            BufWriter::with_capacity(IO_BUFFER_SIZE, file),
            levels,
        ))
    }
}

impl<W: Write> MbpWriter<W> {
    /// Wrap a writer; rows carry `levels` ranks per side.
    pub fn new(inner: W, levels: usize) -> Self {
        let writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_writer(inner);
        Self {
            writer,
            levels,
            record_type: MBP10_RTYPE,
            record: StringRecord::with_capacity(256, 14 + 6 * levels),
            scratch: String::with_capacity(32),
            rows_written: 0,
            header_written: false,
        }
    }

    /// Set the tag written in the `rtype` column.
    pub fn with_record_type(mut self, rtype: u8) -> Self {
        self.record_type = rtype;
        self
    }

    /// Ranks per side in each row.
    #[inline]
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Data rows written so far (header excluded).
    #[inline]
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Write the header row. Only the first call writes anything.
    pub fn write_header(&mut self) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        self.writer.write_record(header(self.levels))?;
        self.header_written = true;
        Ok(())
    }

    /// Write one row. The header is written first if it has not been yet.
    ///
    /// Snapshots deeper than the writer are truncated; shallower ones are
    /// padded with placeholders.
    pub fn write_record(&mut self, row: &MbpRecord) -> Result<()> {
        self.write_header()?;

        let p = &row.passthrough;
        self.record.clear();
        self.record.push_field(&p.ts_recv);
        self.record.push_field(&p.ts_event);
        self.push_display(self.record_type);
        self.record.push_field(&p.publisher_id);
        self.record.push_field(&p.instrument_id);
        self.push_display(row.action.as_char());
        self.push_display(row.side.as_char());
        match row.depth {
            Some(depth) => self.push_display(depth),
            None => self.record.push_field("-1"),
        }
        self.push_display(row.price);
        self.push_display(row.size);
        self.record.push_field(&p.flags);
        self.record.push_field(&p.ts_in_delta);
        self.record.push_field(&p.sequence);

        for side in [&row.book.bids, &row.book.asks] {
            for i in 0..self.levels {
                let level = side.get(i).copied().unwrap_or(LevelSnapshot::EMPTY);
                match level.price {
                    Some(price) => self.push_display(price),
                    None => self.record.push_field(""),
                }
                self.push_display(level.size);
                self.push_display(level.count);
            }
        }
        self.record.push_field(&p.symbol);

        self.writer.write_record(&self.record)?;
        self.rows_written += 1;
        Ok(())
    }

    fn push_display(&mut self, value: impl std::fmt::Display) {
        self.scratch.clear();
        // Writing into a String cannot fail.
        let _ = write!(self.scratch, "{value}");
        self.record.push_field(&self.scratch);
    }

    /// Flush buffered rows to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::MbpError::Io(e.error().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::BookSnapshot;
    use crate::types::{Passthrough, Price, RowAction, Side};

    fn render(rows: &[MbpRecord], levels: usize) -> String {
        let mut writer = MbpWriter::new(Vec::new(), levels);
        writer.write_header().unwrap();
        for row in rows {
            writer.write_record(row).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    fn sample_row(levels: usize) -> MbpRecord {
        let mut book = BookSnapshot::new(levels);
        book.bids[0] = LevelSnapshot {
            price: Some(Price::from_f64(10.0)),
            size: 8,
            count: 2,
        };
        book.asks[0] = LevelSnapshot {
            price: Some("20.25".parse().unwrap()),
            size: 4,
            count: 1,
        };
        MbpRecord {
            passthrough: Passthrough {
                ts_recv: "1000".into(),
                ts_event: "999".into(),
                publisher_id: "2".into(),
                instrument_id: "1108".into(),
                flags: "130".into(),
                ts_in_delta: "165".into(),
                sequence: "42".into(),
                symbol: "ARL".into(),
            },
            action: RowAction::Add,
            side: Side::Bid,
            depth: Some(0),
            price: Price::from_f64(10.0),
            size: 3,
            book,
        }
    }

    #[test]
    fn test_header_layout() {
        let h = header(2);
        assert_eq!(h.len(), 13 + 2 * 2 * 3 + 1);
        assert_eq!(h[7], "depth");
        assert_eq!(h[13], "bid_px_00");
        assert_eq!(h[16], "bid_px_01");
        assert_eq!(h[19], "ask_px_00");
        assert_eq!(h.last().unwrap(), "symbol");
    }

    #[test]
    fn test_row_rendering() {
        let out = render(&[sample_row(2)], 2);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "1000,999,10,2,1108,A,B,0,10,3,130,165,42,10,8,2,,0,0,20.25,4,1,,0,0,ARL"
        );
    }

    #[test]
    fn test_unknown_depth_is_minus_one() {
        let mut row = sample_row(1);
        row.depth = None;
        row.action = RowAction::Cancel;
        let out = render(&[row], 1);
        let fields: Vec<&str> = out.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(fields[5], "C");
        assert_eq!(fields[7], "-1");
    }

    #[test]
    fn test_pads_and_truncates_to_writer_levels() {
        let out = render(&[sample_row(1)], 3);
        let row = out.lines().nth(1).unwrap();
        assert_eq!(row.split(',').count(), 13 + 18 + 1);

        let out = render(&[sample_row(5)], 1);
        let row = out.lines().nth(1).unwrap();
        assert_eq!(row.split(',').count(), 13 + 6 + 1);
    }

    #[test]
    fn test_header_written_once() {
        let mut writer = MbpWriter::new(Vec::new(), 1).with_record_type(7);
        writer.write_record(&sample_row(1)).unwrap();
        writer.write_header().unwrap();
        writer.write_record(&sample_row(1)).unwrap();
        assert_eq!(writer.rows_written(), 2);

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out.lines().filter(|l| l.starts_with("ts_recv")).count(), 1);
        assert_eq!(out.lines().nth(1).unwrap().split(',').nth(2), Some("7"));
    }
}
