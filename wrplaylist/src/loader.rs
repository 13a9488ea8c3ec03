//! Program file loading.
//!
//! A program file is a headerless CSV document, two columns per row:
//! the URL to display and how long to display it for. Quoting is
//! lenient: both `https://a,10s` and `"https://a","10s"` load.
//!
//! Malformed rows are skipped, not fatal: a bad duration or a wrong
//! column count drops that row with a warning and the rest of the file
//! still loads. Only an unreadable file is an error.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::duration::parse_go_duration;
use crate::error::{Error, Result};
use crate::Program;

/// Loads an ordered program list from `path`.
pub fn load_program_list(path: impl AsRef<Path>) -> Result<Vec<Program>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| Error::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let mut list = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(line);
        if fields.len() != 2 {
            warn!(
                row = lineno + 1,
                columns = fields.len(),
                "Program rejected: expected 2 columns"
            );
            continue;
        }
        let duration = match parse_go_duration(&fields[1]) {
            Ok(d) => d,
            Err(_) => {
                warn!(row = lineno + 1, duration = %fields[1], "Program rejected: invalid duration");
                continue;
            }
        };
        list.push(Program {
            url: fields[0].clone(),
            duration,
        });
    }

    info!(count = list.len(), file = %path.display(), "Loaded program list");
    Ok(list)
}

/// Splits one CSV record with lenient quoting: a quote only opens a
/// quoted field at the start of a field, `""` inside quotes escapes a
/// literal quote, and stray quotes mid-field stay literal.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' if field.is_empty() => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn program_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_in_file_order() {
        let file = program_file("https://a,10s\nhttps://b,2m\n");
        let list = load_program_list(file.path()).unwrap();
        assert_eq!(
            list,
            vec![
                Program {
                    url: "https://a".into(),
                    duration: Duration::from_secs(10)
                },
                Program {
                    url: "https://b".into(),
                    duration: Duration::from_secs(120)
                },
            ]
        );
    }

    #[test]
    fn loads_quoted_fields() {
        let file = program_file("\"https://a\",\"10s\"\n");
        let list = load_program_list(file.path()).unwrap();
        assert_eq!(list[0].url, "https://a");
        assert_eq!(list[0].duration, Duration::from_secs(10));
    }

    #[test]
    fn drops_bad_duration_keeps_rest() {
        let file = program_file("https://a,notaduration\nhttps://b,5s\n");
        let list = load_program_list(file.path()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].url, "https://b");
    }

    #[test]
    fn drops_short_rows_keeps_rest() {
        let file = program_file("justonefield\nhttps://b,5s\na,b,c\n");
        let list = load_program_list(file.path()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].url, "https://b");
    }

    #[test]
    fn skips_blank_lines() {
        let file = program_file("\nhttps://a,1s\n\n");
        let list = load_program_list(file.path()).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = load_program_list("/nonexistent/programs.csv").unwrap_err();
        assert!(matches!(err, Error::Unreadable { .. }));
    }

    #[test]
    fn quoted_comma_stays_in_field() {
        let file = program_file("\"https://a/?x=1,y=2\",10s\n");
        let list = load_program_list(file.path()).unwrap();
        assert_eq!(list[0].url, "https://a/?x=1,y=2");
    }
}
