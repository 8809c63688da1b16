use crate::domain::model::Row;
use crate::domain::ports::{RowSink, RowSource};
use crate::utils::encoding::TextCodec;
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 逗號分隔、雙引號包覆的 CSV 輸入
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    codec: TextCodec,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, codec: TextCodec) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }
}

impl RowSource for CsvSource {
    fn read_rows(&self) -> Result<Vec<Row>> {
        let bytes = std::fs::read(&self.path).map_err(|e| EtlError::read(&self.path, e))?;
        let text = self
            .codec
            .decode(&bytes)
            .map_err(|e| EtlError::read(&self.path, e))?;

        // 每列欄位數可以不同，短列留到投影時再檢查
        let input = text.as_bytes();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(b',')
            .quote(b'"')
            .from_reader(input);

        let mut rows: Vec<Row> = Vec::new();
        let mut record = csv::StringRecord::new();
        loop {
            let start = reader.position().byte() as usize;
            let more = reader.read_record(&mut record).map_err(|e| {
                EtlError::read(&self.path, format!("record {}: {}", rows.len() + 1, e))
            })?;
            let end = reader.position().byte() as usize;

            // csv 會略過空白行，補回成沒有欄位的列
            let blank = skipped_blank_lines(input, start, end);
            rows.extend(std::iter::repeat_with(Row::new).take(blank));

            if !more {
                break;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// 一次讀取所消耗的位元組開頭連續的換行數，`\r\n` 算一行。
/// 上一筆記錄以 `\r` 結束時，緊接的 `\n` 屬於上一筆
fn skipped_blank_lines(text: &[u8], start: usize, end: usize) -> usize {
    let Some(mut rest) = text.get(start..end) else {
        return 0;
    };
    if start > 0 && text[start - 1] == b'\r' {
        rest = rest.strip_prefix(b"\n").unwrap_or(rest);
    }

    let mut count = 0;
    while let Some((&byte, tail)) = rest.split_first() {
        match byte {
            b'\r' => rest = tail.strip_prefix(b"\n").unwrap_or(tail),
            b'\n' => rest = tail,
            _ => break,
        }
        count += 1;
    }
    count
}

/// CSV 輸出。先寫入同目錄的暫存檔，成功後再改名覆蓋目的檔
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    codec: TextCodec,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>, codec: TextCodec) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }

    fn render(&self, rows: &[Row]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());

        for row in rows {
            writer
                .write_record(row)
                .map_err(|e| EtlError::write(&self.path, e))?;
        }

        let buffer = writer
            .into_inner()
            .map_err(|e| EtlError::write(&self.path, e.error()))?;
        let text = String::from_utf8(buffer).map_err(|e| EtlError::write(&self.path, e))?;

        self.codec
            .encode(&text)
            .map_err(|e| EtlError::write(&self.path, e))
    }
}

impl RowSink for CsvSink {
    fn write_rows(&self, rows: &[Row]) -> Result<()> {
        let bytes = self.render(rows)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| EtlError::write(&self.path, e))?;
        temp.write_all(&bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| EtlError::write(&self.path, e))?;
        temp.persist(&self.path)
            .map_err(|e| EtlError::write(&self.path, e.error))?;

        tracing::debug!(
            "Wrote {} rows ({} bytes) to {}",
            rows.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::encoding::DecodeErrorPolicy;
    use tempfile::TempDir;

    fn row(values: &[&str]) -> Row {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_read_quoted_and_ragged_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "id,\"full, name\"\n1,\"Ann \"\"A\"\"\"\n2\n").unwrap();

        let rows = CsvSource::new(&path, TextCodec::default()).read_rows().unwrap();

        assert_eq!(
            rows,
            vec![row(&["id", "full, name"]), row(&["1", "Ann \"A\""]), row(&["2"])]
        );
    }

    #[test]
    fn test_blank_lines_become_empty_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "\nname\nAnn\n\n\nBob\n\n").unwrap();

        let rows = CsvSource::new(&path, TextCodec::default()).read_rows().unwrap();

        let empty = Row::new();
        assert_eq!(
            rows,
            vec![
                empty.clone(),
                row(&["name"]),
                row(&["Ann"]),
                empty.clone(),
                empty.clone(),
                row(&["Bob"]),
                empty,
            ]
        );
    }

    #[test]
    fn test_blank_lines_with_crlf_and_multiline_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "a,b\r\n\r\n\"x\r\n\r\ny\",2\r\n3,4\r\n").unwrap();

        let rows = CsvSource::new(&path, TextCodec::default()).read_rows().unwrap();

        assert_eq!(
            rows,
            vec![
                row(&["a", "b"]),
                Row::new(),
                row(&["x\r\n\r\ny", "2"]),
                row(&["3", "4"]),
            ]
        );
    }

    #[test]
    fn test_skipped_blank_lines() {
        assert_eq!(skipped_blank_lines(b"\n\r\n\rab", 0, 5), 3);
        // 上一筆以 \r 結束，後面的 \n 是同一個換行
        assert_eq!(skipped_blank_lines(b"a\r\nb", 2, 4), 0);
        assert_eq!(skipped_blank_lines(b"a\r\n\nb", 2, 5), 1);
        assert_eq!(skipped_blank_lines(b"ab", 0, 2), 0);
        assert_eq!(skipped_blank_lines(b"ab", 3, 5), 0);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.csv");

        let err = CsvSource::new(&path, TextCodec::default())
            .read_rows()
            .unwrap_err();
        assert!(matches!(err, EtlError::ReadError { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_strict_decoding_fails_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, b"id\n\xff\n").unwrap();

        let strict = TextCodec::for_label("utf-8", DecodeErrorPolicy::Strict).unwrap();
        let err = CsvSource::new(&path, strict).read_rows().unwrap_err();
        assert!(matches!(err, EtlError::ReadError { .. }));

        let lenient = CsvSource::new(&path, TextCodec::default()).read_rows().unwrap();
        assert_eq!(lenient[1], row(&["\\xff"]));
    }

    #[test]
    fn test_write_quotes_when_needed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let sink = CsvSink::new(&path, TextCodec::default());
        sink.write_rows(&[row(&["a,b", "plain"]), row(&["say \"hi\"", ""])])
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "\"a,b\",plain\r\n\"say \"\"hi\"\"\",\r\n");
    }

    #[test]
    fn test_write_overwrites_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content\n").unwrap();

        CsvSink::new(&path, TextCodec::default())
            .write_rows(&[row(&["fresh"])])
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\r\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_encoding_failure_keeps_destination_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let strict = TextCodec::for_label("cp1252", DecodeErrorPolicy::Strict).unwrap();
        let err = CsvSink::new(&path, strict)
            .write_rows(&[row(&["\u{4e2d}"])])
            .unwrap_err();

        assert!(matches!(err, EtlError::WriteError { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("out.csv");

        let err = CsvSink::new(&path, TextCodec::default())
            .write_rows(&[row(&["x"])])
            .unwrap_err();
        assert!(matches!(err, EtlError::WriteError { .. }));
    }
}
