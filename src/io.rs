//! Reading names and history tables, writing the results.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::history::HistoryMatrix;
use crate::participant::{Id, Participant, ParticipantTable};
use crate::{RegroupError, Result};

pub const HISTORY_FILE_NAME: &str = "updated_matchings_history.csv";
pub const MATCHING_FILE_NAME: &str = "matching.txt";

const STATUS_COLUMN: &str = "status";
const STATUS_PREFIX: &str = "status_";
const WANTS_MIXING_COLUMN: &str = "wants_mixing";
const WANTS_MIXING_PREFIX: &str = "wants_mixing_";

/// What to do when an output file already exists.
pub enum OverwritePolicy<'a> {
    Overwrite,
    /// Ask for another file name; an empty answer overwrites. A name
    /// without an extension gets the default file's extension.
    Prompt(&'a mut dyn FnMut(&Path) -> Result<String>),
}

fn parse_flag(value: &str, column: &str) -> Result<Option<bool>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "y" => Ok(Some(true)),
        "0" | "false" | "no" | "n" => Ok(Some(false)),
        other => Err(RegroupError::Format(format!(
            "column '{}' holds '{}', expected a 0/1 flag",
            column, other
        ))),
    }
}

fn parse_id(value: &str) -> Result<Id> {
    value
        .trim()
        .parse::<Id>()
        .map_err(|_| RegroupError::Format(format!("'{}' is not an integer identity", value)))
}

/// Role of a names-table column.
enum Column {
    Id,
    Name,
    Joins,
    Status(String),
    WantsMixing,
    WantsMixingFor(String),
    Ignored,
}

fn classify(header: &str) -> Column {
    let header = header.trim();
    match header {
        "id" => Column::Id,
        "name" | "names" => Column::Name,
        "joins" => Column::Joins,
        STATUS_COLUMN => Column::Status(STATUS_COLUMN.to_string()),
        WANTS_MIXING_COLUMN => Column::WantsMixing,
        _ => {
            if let Some(dim) = header.strip_prefix(WANTS_MIXING_PREFIX) {
                Column::WantsMixingFor(dim.to_string())
            } else if let Some(dim) = header.strip_prefix(STATUS_PREFIX) {
                Column::Status(dim.to_string())
            } else {
                Column::Ignored
            }
        }
    }
}

fn read_participants_csv(path: &Path) -> Result<ParticipantTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<Column> = reader.headers()?.iter().map(classify).collect();
    if !columns.iter().any(|c| matches!(c, Column::Id)) {
        return Err(RegroupError::Format(format!("{} has no 'id' column", path.display())));
    }
    if !columns.iter().any(|c| matches!(c, Column::Name)) {
        return Err(RegroupError::Format(format!("{} has no 'name' column", path.display())));
    }

    let mut participants = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut participant = Participant::new(0, "");
        for (column, value) in columns.iter().zip(record.iter()) {
            match column {
                Column::Id => participant.id = parse_id(value)?,
                Column::Name => participant.name = value.trim().to_string(),
                Column::Joins => {
                    if let Some(joins) = parse_flag(value, "joins")? {
                        participant.joins = joins;
                    }
                }
                Column::Status(dim) => {
                    let value = value.trim();
                    if !value.is_empty() {
                        participant.status.insert(dim.clone(), value.to_string());
                    }
                }
                Column::WantsMixing => {
                    if let Some(flag) = parse_flag(value, WANTS_MIXING_COLUMN)? {
                        participant.wants_mixing = flag;
                    }
                }
                Column::WantsMixingFor(dim) => {
                    if let Some(flag) = parse_flag(value, WANTS_MIXING_COLUMN)? {
                        participant.wants_mixing_by_dimension.insert(dim.clone(), flag);
                    }
                }
                Column::Ignored => {}
            }
        }
        participants.push(participant);
    }
    ParticipantTable::new(participants)
}

/// Read the names table from `.csv` or `.json`.
pub fn read_participants(path: &Path) -> Result<ParticipantTable> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let table = match extension.as_str() {
        "csv" => read_participants_csv(path)?,
        "json" => {
            let participants: Vec<Participant> = serde_json::from_reader(File::open(path)?)?;
            ParticipantTable::new(participants)?
        }
        other => return Err(RegroupError::UnsupportedFormat(format!("'{}' ({})", other, path.display()))),
    };
    debug!("[io] Read {} participants from {}", table.len(), path.display());
    Ok(table)
}

/// Square CSV: header `id,<ids...>`, then one row per identity in the
/// same order.
pub fn read_history(path: &Path) -> Result<HistoryMatrix> {
    let mut reader = csv::Reader::from_path(path)?;
    let header_ids: Vec<Id> = reader
        .headers()?
        .iter()
        .skip(1)
        .map(parse_id)
        .collect::<Result<_>>()?;

    let mut row_ids = Vec::with_capacity(header_ids.len());
    let mut rows = Vec::with_capacity(header_ids.len());
    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let id = parse_id(fields.next().unwrap_or(""))?;
        let row: Vec<u32> = fields
            .map(|value| {
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| RegroupError::Format(format!("history count '{}' is not a non-negative integer", value)))
            })
            .collect::<Result<_>>()?;
        row_ids.push(id);
        rows.push(row);
    }

    if row_ids != header_ids {
        return Err(RegroupError::Format(
            "history row identities do not match its column identities".to_string(),
        ));
    }
    HistoryMatrix::from_rows(&header_ids, rows)
}

/// Read the history at `path`, or start from zero over every listed
/// participant when no path is given. A path that does not exist is an
/// error.
pub fn read_or_create_history(path: Option<&Path>, participants: &ParticipantTable) -> Result<HistoryMatrix> {
    match path {
        Some(p) => {
            if !p.is_file() {
                return Err(RegroupError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("history file {} does not exist", p.display()),
                )));
            }
            let history = read_history(p)?;
            debug!("[io] Read history over {} identities from {}", history.len(), p.display());
            Ok(history)
        }
        None => {
            debug!("[io] No history file, starting from zero");
            HistoryMatrix::create(&participants.ids())
        }
    }
}

fn resolve_output_path(dir: &Path, default_name: &str, policy: OverwritePolicy<'_>) -> Result<PathBuf> {
    let path = dir.join(default_name);
    match policy {
        OverwritePolicy::Prompt(ask) if path.exists() => {
            let answer = ask(&path)?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(path);
            }
            let mut renamed = dir.join(answer);
            if renamed.extension().is_none() {
                if let Some(extension) = path.extension() {
                    renamed.set_extension(extension);
                }
            }
            Ok(renamed)
        }
        _ => Ok(path),
    }
}

pub fn write_history(history: &HistoryMatrix, dir: &Path, policy: OverwritePolicy<'_>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = resolve_output_path(dir, HISTORY_FILE_NAME, policy)?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(&path)?;
    let mut header = vec!["id".to_string()];
    header.extend(history.ids().iter().map(|id| id.to_string()));
    writer.write_record(&header)?;
    for (id, row) in history.ids().iter().zip(history.rows()) {
        let mut record = vec![id.to_string()];
        record.extend(row.iter().map(|count| count.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!("[io] Wrote matchings history to {}", path.display());
    Ok(path)
}

pub fn write_matching(text: &str, dir: &Path, policy: OverwritePolicy<'_>) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = resolve_output_path(dir, MATCHING_FILE_NAME, policy)?;
    fs::write(&path, text)?;
    info!("[io] Wrote matching to {}", path.display());
    Ok(path)
}
