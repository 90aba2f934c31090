//! Delimited-text export of JSON rows

use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::core::error::{ApiResult, MappingError};

/// Writes rows keyed by column name into an in-memory CSV buffer.
///
/// Column order is fixed by `fieldnames`. Missing keys render as empty
/// cells, extra keys are ignored. Output uses comma, double quotes and CRLF.
#[derive(Debug, Clone)]
pub struct CsvWriter {
    fieldnames: Vec<String>,
    buffer: Vec<u8>,
}

impl CsvWriter {
    pub fn new<I, S>(fieldnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fieldnames: fieldnames.into_iter().map(Into::into).collect(),
            buffer: Vec::new(),
        }
    }

    pub fn fieldnames(&self) -> &[String] {
        &self.fieldnames
    }

    /// Write the column names as a row of their own
    pub fn write_header(&mut self) -> ApiResult<()> {
        let header: Vec<Cow<'_, str>> = self
            .fieldnames
            .iter()
            .map(|name| Cow::Borrowed(name.as_str()))
            .collect();
        append_record(&mut self.buffer, &header)
    }

    pub fn write_row(&mut self, row: &Map<String, Value>) -> ApiResult<()> {
        let cells: Vec<Cow<'_, str>> = self
            .fieldnames
            .iter()
            .map(|name| cell_text(row.get(name)))
            .collect();
        append_record(&mut self.buffer, &cells)
    }

    /// Write rows one at a time, in input order
    pub fn write_rows<'r, I>(&mut self, rows: I) -> ApiResult<()>
    where
        I: IntoIterator<Item = &'r Map<String, Value>>,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Everything written so far; the writer stays usable
    pub fn stream_data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

fn cell_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

fn append_record(buffer: &mut Vec<u8>, cells: &[Cow<'_, str>]) -> ApiResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(buffer);
    writer.write_record(cells.iter().map(|cell| cell.as_bytes()))?;
    writer.flush().map_err(|e| MappingError::Csv {
        message: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_missing_key_renders_empty() {
        let mut writer = CsvWriter::new(["a", "b"]);
        writer.write_row(&row(json!({"a": "1"}))).unwrap();
        assert_eq!(writer.stream_data(), b"1,\r\n");
    }

    #[test]
    fn test_extra_keys_ignored_and_order_kept() {
        let mut writer = CsvWriter::new(["b", "a"]);
        writer
            .write_row(&row(json!({"a": "1", "b": "2", "c": "3"})))
            .unwrap();
        assert_eq!(writer.stream_data(), b"2,1\r\n");
    }

    #[test]
    fn test_non_text_cells() {
        let mut writer = CsvWriter::new(["n", "flag", "none", "list"]);
        writer
            .write_row(&row(json!({"n": 42, "flag": true, "none": null, "list": [1, 2]})))
            .unwrap();
        assert_eq!(writer.stream_data(), b"42,true,,\"[1,2]\"\r\n");
    }

    #[test]
    fn test_quoting_and_unicode() {
        let mut writer = CsvWriter::new(["name", "note"]);
        writer
            .write_row(&row(json!({"name": "Zoë", "note": "says \"hi\", twice"})))
            .unwrap();
        let text = String::from_utf8(writer.stream_data().to_vec()).unwrap();
        assert_eq!(text, "Zoë,\"says \"\"hi\"\", twice\"\r\n");
    }

    #[test]
    fn test_stream_data_mid_write() {
        let mut writer = CsvWriter::new(["a"]);
        writer.write_header().unwrap();
        assert_eq!(writer.stream_data(), b"a\r\n");
        writer
            .write_rows(&[row(json!({"a": "1"})), row(json!({"a": "2"}))])
            .unwrap();
        assert_eq!(writer.stream_data(), b"a\r\n1\r\n2\r\n");
        assert_eq!(writer.clone().into_inner(), b"a\r\n1\r\n2\r\n".to_vec());
    }
}
