use crate::error::WrangleError;
use crate::table::{Row, Table};
use anyhow::Result;
use serde_json::Value;
use std::io::{self, BufRead};

/// Payload layout, decided from the first non-empty line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonFormat {
    /// One self-contained object per line.
    Lines,
    /// The whole payload is a single JSON value (object or array of objects).
    Document,
}

/// A first line that is a whole object (`{ ... }`) means JSON-lines.
pub fn detect_format(first_line: &str) -> JsonFormat {
    let t = first_line.trim();
    if t.starts_with('{') && t.ends_with('}') {
        JsonFormat::Lines
    } else {
        JsonFormat::Document
    }
}

/// Minimal NDJSON line reader over any buffered source.
/// Strips trailing `\r?\n`.
pub struct NdjsonReader<R: BufRead> {
    rdr: R,
}

impl<R: BufRead> NdjsonReader<R> {
    pub fn new(rdr: R) -> Self {
        Self { rdr }
    }

    /// Read the next line into `buf`. Returns the number of bytes read (0 on EOF).
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf)?;
        if n == 0 { return Ok(0); }
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') { buf.pop(); }
        }
        Ok(n)
    }

    fn into_inner(self) -> R {
        self.rdr
    }
}

/// Parse a JSON-lines or single-document payload into a table.
/// `source_name` is only used in error messages. `nrows` caps the record count.
pub fn read_records<R: BufRead>(rdr: R, source_name: &str, nrows: Option<usize>) -> Result<Table> {
    let mut reader = NdjsonReader::new(rdr);
    let mut buf = String::with_capacity(16 * 1024);
    let mut line_no = 0usize;

    // skip leading blank lines
    loop {
        if reader.read_line(&mut buf)? == 0 {
            return Ok(Table::new());
        }
        line_no += 1;
        if !buf.trim().is_empty() { break; }
    }

    let cap = nrows.unwrap_or(usize::MAX);
    let mut table = Table::new();

    match detect_format(&buf) {
        JsonFormat::Lines => {
            loop {
                if table.len() >= cap { break; }
                if !buf.trim().is_empty() {
                    table.push(parse_object_line(&buf, source_name, line_no)?);
                }
                if reader.read_line(&mut buf)? == 0 { break; }
                line_no += 1;
            }
        }
        JsonFormat::Document => {
            let mut rest = String::new();
            io::Read::read_to_string(&mut reader.into_inner(), &mut rest)?;
            buf.push('\n');
            buf.push_str(&rest);
            let doc: Value = serde_json::from_str(&buf).map_err(|e| WrangleError::Parse {
                source_name: source_name.to_string(),
                line: e.line(),
                message: e.to_string(),
            })?;
            for row in document_rows(doc, source_name)?.into_iter().take(cap) {
                table.push(row);
            }
        }
    }
    Ok(table)
}

fn parse_object_line(line: &str, source_name: &str, line_no: usize) -> Result<Row> {
    let parse_err = |message: String| WrangleError::Parse {
        source_name: source_name.to_string(),
        line: line_no,
        message,
    };
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(other) => Err(parse_err(format!("expected an object, found {}", kind_of(&other))).into()),
        Err(e) => Err(parse_err(e.to_string()).into()),
    }
}

fn document_rows(doc: Value, source_name: &str) -> Result<Vec<Row>> {
    let not_object = |idx: usize| WrangleError::Parse {
        source_name: source_name.to_string(),
        line: 1,
        message: format!("array element {} is not an object", idx),
    };
    match doc {
        Value::Object(m) => Ok(vec![m]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(m) => Ok(m),
                _ => Err(not_object(i).into()),
            })
            .collect(),
        other => Err(WrangleError::Parse {
            source_name: source_name.to_string(),
            line: 1,
            message: format!("expected an object or array, found {}", kind_of(&other)),
        }
        .into()),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
