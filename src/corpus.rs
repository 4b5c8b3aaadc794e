use std::{fs::File, io::Read, path::Path};

use csv::{Reader, StringRecord, StringRecordsIntoIter};

use crate::bayes::Document;
use crate::error::{Error, Result};

const TAG_COLUMN: &str = "tag";
const CONTENT_COLUMN: &str = "content";

/// Reads labeled documents from a CSV file with `tag` and `content` columns.
/// Any other columns are ignored and the column order doesn't matter.
pub struct CorpusReader<R> {
    records: StringRecordsIntoIter<R>,
    tag_idx: usize,
    content_idx: usize,
}

impl CorpusReader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(csv::Reader::from_path(path)?)
    }
}

impl<R: Read> CorpusReader<R> {
    pub fn from_reader(rdr: R) -> Result<Self> {
        Self::new(csv::Reader::from_reader(rdr))
    }

    fn new(mut reader: Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let tag_idx = column(&headers, TAG_COLUMN)?;
        let content_idx = column(&headers, CONTENT_COLUMN)?;

        Ok(CorpusReader {
            records: reader.into_records(),
            tag_idx,
            content_idx,
        })
    }

    fn document(&self, record: &StringRecord) -> Result<Document> {
        let line = record.position().map_or(0, |pos| pos.line());
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .map(str::to_string)
                .ok_or_else(|| Error::MalformedRow {
                    line,
                    reason: format!("csv record missing {name} entry"),
                })
        };

        Ok(Document {
            label: field(self.tag_idx, TAG_COLUMN)?,
            content: field(self.content_idx, CONTENT_COLUMN)?,
        })
    }
}

impl<R: Read> Iterator for CorpusReader<R> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map_err(Error::from).and_then(|record| self.document(&record)))
    }
}

fn column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| Error::MalformedRow {
            line: 1,
            reason: format!("header has no `{name}` column"),
        })
}
