// src/disfluency/records.rs

//! Plain records exchanged with the JSONL/CSV adapters, and the adapters
//! themselves. Readers are lenient: anything that does not look like a record
//! is skipped, never fatal.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::Result;

/// Field names tried, in order, for the clean sentence of a synthesis input.
const CLEAN_FIELDS: &[&str] = &["clean", "output", "text"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub input: String,
    pub output: String,
}

/// A pair plus its 1-based line number in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub idx: usize,
    pub input: String,
    pub output: String,
}

impl Row {
    pub fn new(idx: usize, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            idx,
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn pair(&self) -> Pair {
        Pair {
            input: self.input.clone(),
            output: self.output.clone(),
        }
    }
}

/// One line of the rejection report. A dropped row yields one per reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub idx: usize,
    pub reason: String,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub input_rows: usize,
    pub kept_rows: usize,
    /// Rows dropped, each counted once however many reasons it collected.
    pub removed_rows: usize,
    /// Report lines written. A linted row yields one per reason, so this can
    /// exceed `removed_rows`.
    pub report_rows: usize,
}

fn first_clean_field(obj: &Value) -> Option<String> {
    CLEAN_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Reads one clean sentence per JSON line from `clean`, `output` or `text`.
pub fn read_clean_sentences<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut sentences = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let obj = match serde_json::from_str::<Value>(line) {
            Ok(obj) => obj,
            Err(err) => {
                warn!(line = i + 1, %err, "skipping unparsable line");
                continue;
            }
        };
        match first_clean_field(&obj) {
            Some(clean) => sentences.push(clean),
            None => debug!(line = i + 1, "no clean text field, skipping"),
        }
    }
    Ok(sentences)
}

/// Parses a pair line, retrying after the first `|` for the legacy
/// `"<index>|{...}"` preview format.
fn parse_pair_line(line: &str) -> Option<Pair> {
    let obj = serde_json::from_str::<Value>(line).ok().or_else(|| {
        let (_, rest) = line.split_once('|')?;
        serde_json::from_str::<Value>(rest).ok()
    })?;
    let field = |name: &str| {
        obj.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Some(Pair {
        input: field("input")?,
        output: field("output")?,
    })
}

/// Reads `{"input","output"}` lines. The row index is the physical line
/// number, blank and skipped lines included, so reports point back into the
/// source file.
pub fn read_pairs<R: BufRead>(reader: R) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_pair_line(line) {
            Some(pair) => rows.push(Row::new(i + 1, pair.input, pair.output)),
            None => debug!(line = i + 1, "skipping malformed pair"),
        }
    }
    Ok(rows)
}

pub fn write_pairs<'a, W, I>(mut writer: W, pairs: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Pair>,
{
    for pair in pairs {
        serde_json::to_writer(&mut writer, pair)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// CSV with header `idx,reason,input,output` and CRLF line endings.
pub fn write_report<W: Write>(mut writer: W, report: &[ReportRow]) -> Result<()> {
    writer.write_all(b"idx,reason,input,output\r\n")?;
    for row in report {
        write!(
            writer,
            "{},{},{},{}\r\n",
            row.idx,
            csv_field(&row.reason),
            csv_field(&row.input),
            csv_field(&row.output)
        )?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn clean_field_fallbacks() {
        let data = r#"{"clean": "a"}
{"output": "b", "text": "ignored"}
{"clean": "", "text": "c"}

{"other": "d"}
not json
[1, 2]
{"clean": 5, "text": "e"}
"#;
        let sentences = read_clean_sentences(Cursor::new(data)).unwrap();
        assert_eq!(sentences, vec!["a", "b", "c", "e"]);
    }

    #[test]
    fn pair_rows_keep_physical_line_numbers() {
        let data = r#"{"input": "um hi", "output": "hi"}

{"input": "x"}
7|{"input": "uh yes", "output": "yes"}
garbage|still garbage
"just a string"
{"input": "", "output": "empty"}
{"input": "嗯 好", "output": "好"}
"#;
        let rows = read_pairs(Cursor::new(data)).unwrap();
        assert_eq!(
            rows,
            vec![
                Row::new(1, "um hi", "hi"),
                Row::new(4, "uh yes", "yes"),
                Row::new(8, "嗯 好", "好"),
            ]
        );
    }

    #[test]
    fn pairs_are_written_with_literal_unicode() {
        let pairs = vec![Pair {
            input: "嗯 好的".to_string(),
            output: "好的".to_string(),
        }];
        let mut buf = Vec::new();
        write_pairs(&mut buf, &pairs).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\"input\":\"嗯 好的\",\"output\":\"好的\"}\n"
        );
    }

    #[test]
    fn report_quotes_only_when_needed() {
        let report = vec![
            ReportRow {
                idx: 3,
                reason: "entity_violation:numbers_units_changed".to_string(),
                input: "it was 80%, ok".to_string(),
                output: "say \"90%\"".to_string(),
            },
            ReportRow {
                idx: 4,
                reason: "hard_duplicate~1".to_string(),
                input: "plain".to_string(),
                output: "text".to_string(),
            },
        ];
        let mut buf = Vec::new();
        write_report(&mut buf, &report).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "idx,reason,input,output\r\n\
             3,entity_violation:numbers_units_changed,\"it was 80%, ok\",\"say \"\"90%\"\"\"\r\n\
             4,hard_duplicate~1,plain,text\r\n"
        );
    }
}
