// Flat-file export reading functions
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::ParseError;
use crate::export::Record;
use crate::models::{EntityType, ReleaseGenre, RELEASE_GENRE_FILE};

/// Parse one export file into records, preserving row order.
///
/// The header must contain every column of the entity's layout and every row
/// must have as many fields as the header. Extra columns are kept, repeated
/// ones are rejected. Cells are trimmed, so a blank cell reads as null.
pub fn read_records<R: Read>(
    reader: R,
    entity: EntityType,
    file: &str,
) -> Result<Vec<Record>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = read_headers(&mut rdr, file)?;
    let expected: Vec<&str> = entity.columns().iter().map(|c| c.name).collect();
    check_columns(&headers, &expected, file)?;

    let file: Arc<str> = Arc::from(file);
    let mut records = Vec::new();

    for result in rdr.records() {
        let row = result.map_err(|source| ParseError::Csv {
            file: file.to_string(),
            source,
        })?;
        let line = line_of(&row);
        check_field_count(&headers, &row, &file, line)?;

        let fields: HashMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();

        records.push(Record::new(file.clone(), line, fields));
    }

    Ok(records)
}

/// Parse the release/genre association export.
pub fn read_release_genres<R: Read>(
    reader: R,
    file: &str,
) -> Result<Vec<ReleaseGenre>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = read_headers(&mut rdr, file)?;
    check_columns(&headers, &["release_id", "genre_id"], file)?;

    let mut links = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|source| ParseError::Csv {
            file: file.to_string(),
            source,
        })?;
        let line = line_of(&row);
        check_field_count(&headers, &row, file, line)?;

        let link: ReleaseGenre = row
            .deserialize(Some(&headers))
            .map_err(|source| ParseError::Csv {
                file: file.to_string(),
                source,
            })?;

        for (column, value) in [("release_id", &link.release_id), ("genre_id", &link.genre_id)] {
            if value.is_empty() {
                return Err(ParseError::MissingValue {
                    file: file.to_string(),
                    line,
                    column: column.to_string(),
                });
            }
        }

        links.push(link);
    }

    Ok(links)
}

fn read_headers<R: Read>(
    rdr: &mut csv::Reader<R>,
    file: &str,
) -> Result<StringRecord, ParseError> {
    rdr.headers().cloned().map_err(|source| ParseError::Csv {
        file: file.to_string(),
        source,
    })
}

fn check_columns(headers: &StringRecord, expected: &[&str], file: &str) -> Result<(), ParseError> {
    let mut seen = HashSet::new();
    if let Some(column) = headers.iter().find(|h| !seen.insert(*h)) {
        return Err(ParseError::DuplicateColumn {
            file: file.to_string(),
            column: column.to_string(),
        });
    }

    match expected
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        Some(column) => Err(ParseError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_field_count(
    headers: &StringRecord,
    row: &StringRecord,
    file: &str,
    line: u64,
) -> Result<(), ParseError> {
    if row.len() != headers.len() {
        return Err(ParseError::FieldCount {
            file: file.to_string(),
            line,
            expected: headers.len(),
            found: row.len(),
        });
    }
    Ok(())
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

/// Directory holding one CSV export per table.
#[derive(Debug, Clone)]
pub struct ExportDir {
    root: PathBuf,
}

impl ExportDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Read every record of one entity's export file.
    pub fn read(&self, entity: EntityType) -> Result<Vec<Record>, ParseError> {
        let file_name = entity
            .export_file()
            .ok_or(ParseError::NotExported(entity))?;
        let path = self.root.join(file_name);

        debug!("Reading {}", path.display());
        let file = File::open(&path).map_err(|source| ParseError::Io {
            file: path.display().to_string(),
            source,
        })?;

        read_records(file, entity, file_name)
    }

    /// Read the secondary genre associations. The export is optional; a
    /// missing file means no release has secondary genres.
    pub fn read_release_genres(&self) -> Result<Vec<ReleaseGenre>, ParseError> {
        let path = self.root.join(RELEASE_GENRE_FILE);
        if !path.exists() {
            info!("No {} found, skipping secondary genres", RELEASE_GENRE_FILE);
            return Ok(Vec::new());
        }

        let file = File::open(&path).map_err(|source| ParseError::Io {
            file: path.display().to_string(),
            source,
        })?;

        read_release_genres(file, RELEASE_GENRE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENRES: &str = "id,name,date_added\n1,Post-rock,2024-01-02\n2,Ambient,\n";

    #[test]
    fn reads_rows_in_source_order() {
        let records = read_records(GENRES.as_bytes(), EntityType::Genre, "genre.csv").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id().unwrap(), "1");
        assert_eq!(records[0].get("name"), Some("Post-rock"));
        assert_eq!(records[1].id().unwrap(), "2");
        assert_eq!(records[1].get("date_added"), None);
        assert_eq!(records[1].line(), 3);
        assert_eq!(records[1].file(), "genre.csv");
    }

    #[test]
    fn header_only_file_has_no_records() {
        let records =
            read_records("id,name,date_added\n".as_bytes(), EntityType::Genre, "genre.csv")
                .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_records("id,date_added\n1,x\n".as_bytes(), EntityType::Genre, "genre.csv")
            .unwrap_err();

        match err {
            ParseError::MissingColumn { file, column } => {
                assert_eq!(file, "genre.csv");
                assert_eq!(column, "name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_is_missing_every_column() {
        let err = read_records("".as_bytes(), EntityType::Genre, "genre.csv").unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { ref column, .. } if column == "id"));
    }

    #[test]
    fn repeated_header_column_is_rejected() {
        let csv = "id,name,date_added,name\n1,Post-rock,2024-01-02,Shoegaze\n";

        let err = read_records(csv.as_bytes(), EntityType::Genre, "genre.csv").unwrap_err();
        match err {
            ParseError::DuplicateColumn { file, column } => {
                assert_eq!(file, "genre.csv");
                assert_eq!(column, "name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_cells_are_null_and_values_are_trimmed() {
        let csv = "id,start,end,completed,type,amount,date_added\n 1 ,,, ,releases, ,2024-01-01\n";

        let records = read_records(csv.as_bytes(), EntityType::Goal, "goal.csv").unwrap();
        assert_eq!(records[0].id().unwrap(), "1");
        assert_eq!(records[0].get("amount"), None);
        assert_eq!(records[0].get("completed"), None);

        let attributes = records[0].to_attributes(EntityType::Goal).unwrap();
        assert!(!attributes.contains_key("amount"));
        assert_eq!(attributes["id"].as_text(), Some("1"));
    }

    #[test]
    fn short_row_is_a_field_count_error() {
        let csv = "id,name,date_added\n1,Post-rock,2024-01-02\n2,Ambient\n";

        let err = read_records(csv.as_bytes(), EntityType::Genre, "genre.csv").unwrap_err();
        match err {
            ParseError::FieldCount {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn quoted_fields_and_extra_columns_survive() {
        let csv = "name,id,date_added,legacy\n\"Rock, Progressive\",9,,old\n";

        let records = read_records(csv.as_bytes(), EntityType::Genre, "genre.csv").unwrap();
        assert_eq!(records[0].get("name"), Some("Rock, Progressive"));
        assert_eq!(records[0].get("legacy"), Some("old"));
    }

    #[test]
    fn reads_release_genre_links() {
        let csv = "release_id,genre_id\n1,2\n1,3\n";

        let links = read_release_genres(csv.as_bytes(), RELEASE_GENRE_FILE).unwrap();
        assert_eq!(
            links,
            vec![
                ReleaseGenre {
                    release_id: "1".into(),
                    genre_id: "2".into()
                },
                ReleaseGenre {
                    release_id: "1".into(),
                    genre_id: "3".into()
                },
            ]
        );
    }

    #[test]
    fn release_genre_link_needs_both_ids() {
        let csv = "release_id,genre_id\n1,\n";

        let err = read_release_genres(csv.as_bytes(), RELEASE_GENRE_FILE).unwrap_err();
        assert!(matches!(err, ParseError::MissingValue { ref column, .. } if column == "genre_id"));
    }

    #[test]
    fn release_genre_ids_are_trimmed() {
        let csv = "release_id,genre_id\n 1, 2\n";

        let links = read_release_genres(csv.as_bytes(), RELEASE_GENRE_FILE).unwrap();
        assert_eq!(links[0].release_id, "1");
        assert_eq!(links[0].genre_id, "2");
    }

    #[test]
    fn missing_export_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let export = ExportDir::new(dir.path());

        assert!(matches!(
            export.read(EntityType::Artist),
            Err(ParseError::Io { .. })
        ));
        assert!(matches!(
            export.read(EntityType::Country),
            Err(ParseError::NotExported(EntityType::Country))
        ));
        assert!(export.read_release_genres().unwrap().is_empty());
    }
}
