//! MBO CSV reader.
//!
//! Reads Databento-style MBO CSV and yields typed [`MboEvent`]s. Columns are
//! resolved by header name; when the input has no header row, the standard
//! Databento MBO column layout is assumed.
//!
//! Lines starting with `#` and blank lines are skipped. Order id and size are
//! always read from their own columns.
//!
//! # Example
//!
//! ```
//! use mbo_mbp_reconstructor::{Action, MboReader, Side};
//!
//! let csv = "\
//! ts_recv,ts_event,rtype,publisher_id,instrument_id,action,side,price,size,channel_id,order_id,flags,ts_in_delta,sequence,symbol
//! 1,1,160,2,1108,A,B,10.5,100,0,42,130,165200,851012,ARL
//! ";
//!
//! let mut reader = MboReader::new(csv.as_bytes());
//! let event = reader.next_event().unwrap().unwrap();
//! assert_eq!(event.action, Action::Add);
//! assert_eq!(event.side, Side::Bid);
//! assert_eq!(event.order_id, 42);
//! assert_eq!(event.size, 100);
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{MbpError, Result};
use crate::types::{Action, MboEvent, Passthrough, Price, Side};

/// I/O buffer size for file input.
///
/// Default `BufReader` uses 8KB; feeds are large sequential reads.
pub const IO_BUFFER_SIZE: usize = 1024 * 1024; // 1 MB

const COLUMN_COUNT: usize = 14;

/// Input columns the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    TsRecv,
    TsEvent,
    Rtype,
    PublisherId,
    InstrumentId,
    Action,
    Side,
    Price,
    Size,
    OrderId,
    Flags,
    TsInDelta,
    Sequence,
    Symbol,
}

impl Column {
    /// Every column, in declaration order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::TsRecv,
        Column::TsEvent,
        Column::Rtype,
        Column::PublisherId,
        Column::InstrumentId,
        Column::Action,
        Column::Side,
        Column::Price,
        Column::Size,
        Column::OrderId,
        Column::Flags,
        Column::TsInDelta,
        Column::Sequence,
        Column::Symbol,
    ];

    /// Columns a header must name.
    pub const REQUIRED: [Column; 5] = [
        Column::Action,
        Column::Side,
        Column::Price,
        Column::Size,
        Column::OrderId,
    ];

    /// Header name of the column.
    pub fn name(self) -> &'static str {
        match self {
            Column::TsRecv => "ts_recv",
            Column::TsEvent => "ts_event",
            Column::Rtype => "rtype",
            Column::PublisherId => "publisher_id",
            Column::InstrumentId => "instrument_id",
            Column::Action => "action",
            Column::Side => "side",
            Column::Price => "price",
            Column::Size => "size",
            Column::OrderId => "order_id",
            Column::Flags => "flags",
            Column::TsInDelta => "ts_in_delta",
            Column::Sequence => "sequence",
            Column::Symbol => "symbol",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Column::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

/// Column → field index mapping for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [Option<usize>; COLUMN_COUNT],
}

impl ColumnMap {
    /// Standard Databento MBO CSV layout:
    /// `ts_recv, ts_event, rtype, publisher_id, instrument_id, action, side,
    /// price, size, channel_id, order_id, flags, ts_in_delta, sequence, symbol`.
    pub fn databento() -> Self {
        let mut map = Self::empty();
        let layout = [
            (Column::TsRecv, 0),
            (Column::TsEvent, 1),
            (Column::Rtype, 2),
            (Column::PublisherId, 3),
            (Column::InstrumentId, 4),
            (Column::Action, 5),
            (Column::Side, 6),
            (Column::Price, 7),
            (Column::Size, 8),
            // 9 = channel_id
            (Column::OrderId, 10),
            (Column::Flags, 11),
            (Column::TsInDelta, 12),
            (Column::Sequence, 13),
            (Column::Symbol, 14),
        ];
        for (column, index) in layout {
            map.indices[column as usize] = Some(index);
        }
        map
    }

    /// Mapping with no columns assigned.
    pub fn empty() -> Self {
        Self {
            indices: [None; COLUMN_COUNT],
        }
    }

    /// Assign `column` to field `index`.
    pub fn with_column(mut self, column: Column, index: usize) -> Self {
        self.indices[column as usize] = Some(index);
        self
    }

    /// Whether a record looks like a header row.
    pub fn is_header(record: &StringRecord) -> bool {
        record
            .iter()
            .any(|f| f.eq_ignore_ascii_case(Column::Action.name()))
    }

    /// Build a mapping from a header row. Unknown columns are ignored.
    ///
    /// # Errors
    /// Returns `MbpError::MissingField` when a required column is absent.
    pub fn from_header(header: &StringRecord, line: u64) -> Result<Self> {
        let mut indices = [None; COLUMN_COUNT];
        for (index, name) in header.iter().enumerate() {
            if let Some(column) = Column::from_name(name) {
                indices[column as usize].get_or_insert(index);
            }
        }

        let map = Self { indices };
        if let Some(missing) = Column::REQUIRED.into_iter().find(|c| map.index(*c).is_none()) {
            return Err(MbpError::MissingField {
                field: missing.name(),
                line,
            });
        }
        Ok(map)
    }

    /// Field index of `column`, if mapped.
    #[inline]
    pub fn index(&self, column: Column) -> Option<usize> {
        self.indices[column as usize]
    }

    /// Text of `column` in `record` (empty when unmapped or short).
    #[inline]
    fn field<'r>(&self, record: &'r StringRecord, column: Column) -> &'r str {
        self.index(column)
            .and_then(|i| record.get(i))
            .unwrap_or("")
    }
}

/// Streaming reader of MBO events from CSV.
pub struct MboReader<R: Read> {
    reader: csv::Reader<R>,
    columns: Option<ColumnMap>,
    record: StringRecord,
    rows_read: u64,
}

impl MboReader<BufReader<File>> {
    /// Open an MBO CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            MbpError::Io(format!("Failed to open {}: {e}", path.display()))
        })?;
        log::debug!("Opened MBO input {}", path.display());
        Ok(Self::new(BufReader::with_capacity(IO_BUFFER_SIZE, file)))
    }
}

impl<R: Read> MboReader<R> {
    /// Create a reader that detects a header row, falling back to the
    /// Databento layout.
    pub fn new(inner: R) -> Self {
        Self {
            reader: ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .comment(Some(b'#'))
                .trim(Trim::All)
                .from_reader(inner),
            columns: None,
            record: StringRecord::new(),
            rows_read: 0,
        }
    }

    /// Create a reader with a fixed column mapping (no header detection).
    pub fn with_columns(inner: R, columns: ColumnMap) -> Self {
        let mut reader = Self::new(inner);
        reader.columns = Some(columns);
        reader
    }

    /// Column mapping in use (known after the first data row).
    pub fn columns(&self) -> Option<&ColumnMap> {
        self.columns.as_ref()
    }

    /// Number of data rows read so far (headers, comments and blanks excluded).
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Read the next event, or `None` at end of input.
    ///
    /// # Errors
    /// CSV/I/O failures, and row-level parse errors carrying the line number.
    /// After a row-level error the reader can continue with the next row.
    pub fn next_event(&mut self) -> Result<Option<MboEvent>> {
        loop {
            if !self.reader.read_record(&mut self.record)? {
                return Ok(None);
            }
            let line = self.record.position().map_or(0, |p| p.line());

            if self.record.iter().all(str::is_empty) {
                continue;
            }
            if self.columns.is_none() && ColumnMap::is_header(&self.record) {
                self.columns = Some(ColumnMap::from_header(&self.record, line)?);
                continue;
            }

            let columns = self.columns.get_or_insert_with(ColumnMap::databento);
            self.rows_read += 1;
            return parse_event(columns, &self.record, line).map(Some);
        }
    }
}

impl<R: Read> Iterator for MboReader<R> {
    type Item = Result<MboEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

fn invalid(field: &'static str, value: &str, line: u64) -> MbpError {
    MbpError::InvalidField {
        field,
        value: value.to_string(),
        line,
    }
}

fn parse_u64(text: &str, field: &'static str, line: u64) -> Result<u64> {
    if text.is_empty() {
        return Ok(0);
    }
    text.parse().map_err(|_| invalid(field, text, line))
}

fn parse_event(columns: &ColumnMap, record: &StringRecord, line: u64) -> Result<MboEvent> {
    let field = |column| columns.field(record, column);

    let action_text = field(Column::Action);
    let action: Action = action_text
        .parse()
        .map_err(|_| invalid("action", action_text, line))?;

    let side_text = field(Column::Side);
    let side: Side = side_text
        .parse()
        .map_err(|_| invalid("side", side_text, line))?;

    let price_text = field(Column::Price);
    let price = if action.requires_price() {
        if price_text.is_empty() {
            return Err(MbpError::MissingField {
                field: "price",
                line,
            });
        }
        price_text
            .parse::<Price>()
            .map_err(|_| invalid("price", price_text, line))?
    } else {
        // Resets and execution reports may carry an undefined price sentinel.
        price_text.parse::<Price>().unwrap_or(Price::ZERO)
    };

    let size = parse_u64(field(Column::Size), "size", line)?;
    let order_id = parse_u64(field(Column::OrderId), "order_id", line)?;

    let passthrough = Passthrough {
        ts_recv: field(Column::TsRecv).to_string(),
        ts_event: field(Column::TsEvent).to_string(),
        publisher_id: field(Column::PublisherId).to_string(),
        instrument_id: field(Column::InstrumentId).to_string(),
        flags: field(Column::Flags).to_string(),
        ts_in_delta: field(Column::TsInDelta).to_string(),
        sequence: field(Column::Sequence).to_string(),
        symbol: field(Column::Symbol).to_string(),
    };

    Ok(MboEvent::new(order_id, action, side, price, size).with_passthrough(passthrough))
}
