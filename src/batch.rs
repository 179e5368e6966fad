//! Batch input and output
//!
//! Tickets are read from CSV (`title`, `body` columns; other columns are
//! ignored, missing cells are empty) or JSON lines. Results are written as flat
//! prediction rows in the same format.

use crate::error::{Result, TriageError};
use crate::ml::TriageOutcome;
use crate::models::{DecisionReason, Priority, Ticket};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use strum::{Display, EnumString};

/// Columns a CSV input must carry
const REQUIRED_COLUMNS: [&str; 2] = ["title", "body"];

/// Batch file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BatchFormat {
    #[default]
    Csv,
    Jsonl,
}

impl BatchFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Read all tickets from `reader`
    pub fn read_tickets<R: Read>(self, reader: R) -> Result<Vec<Ticket>> {
        match self {
            BatchFormat::Csv => read_csv(reader),
            BatchFormat::Jsonl => read_jsonl(reader),
        }
    }

    /// Write prediction rows to `writer`
    pub fn write_rows<W: Write>(self, writer: W, rows: &[PredictionRow]) -> Result<()> {
        match self {
            BatchFormat::Csv => write_csv(writer, rows),
            BatchFormat::Jsonl => write_jsonl(writer, rows),
        }
    }
}

/// One output row: the ticket plus its predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub title: String,
    pub body: String,
    pub pred_category: Option<String>,

    /// Category confidence, empty when the model has no probabilities
    pub prob_category: Option<f64>,

    pub pred_priority: Option<Priority>,

    /// Classifier confidence, empty for rule decisions
    pub prob_priority_ml: Option<f64>,

    pub priority_reason: Option<DecisionReason>,

    /// Set when the ticket could not be triaged
    pub error: Option<String>,
}

impl PredictionRow {
    pub fn new(ticket: &Ticket, result: &Result<TriageOutcome>) -> Self {
        let mut row = Self {
            title: ticket.title.clone(),
            body: ticket.body.clone(),
            pred_category: None,
            prob_category: None,
            pred_priority: None,
            prob_priority_ml: None,
            priority_reason: None,
            error: None,
        };

        match result {
            Ok(outcome) => {
                row.pred_category = Some(outcome.category.clone());
                row.prob_category = outcome.category_confidence;
                row.pred_priority = Some(outcome.priority.priority);
                row.prob_priority_ml = outcome.priority.confidence;
                row.priority_reason = Some(outcome.priority.reason);
            }
            Err(e) => row.error = Some(e.to_string()),
        }

        row
    }
}

/// Pair tickets with their results, in input order
pub fn prediction_rows(tickets: &[Ticket], results: &[Result<TriageOutcome>]) -> Vec<PredictionRow> {
    tickets
        .iter()
        .zip(results)
        .map(|(ticket, result)| PredictionRow::new(ticket, result))
        .collect()
}

fn read_csv<R: Read>(reader: R) -> Result<Vec<Ticket>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
            TriageError::Validation(format!(
                "CSV input must contain the columns {}",
                REQUIRED_COLUMNS.join(", ")
            ))
        })
    };
    let title_idx = column(REQUIRED_COLUMNS[0])?;
    let body_idx = column(REQUIRED_COLUMNS[1])?;

    let mut tickets = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Short rows leave trailing cells empty
        let cell = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        tickets.push(Ticket::new(cell(title_idx), cell(body_idx)));
    }

    Ok(tickets)
}

fn read_jsonl<R: Read>(reader: R) -> Result<Vec<Ticket>> {
    let mut tickets = Vec::new();

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let ticket: Ticket = serde_json::from_str(&line)
            .map_err(|e| TriageError::Serialization(format!("line {}: {}", idx + 1, e)))?;
        tickets.push(ticket);
    }

    Ok(tickets)
}

fn write_csv<W: Write>(writer: W, rows: &[PredictionRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_jsonl<W: Write>(mut writer: W, rows: &[PredictionRow]) -> Result<()> {
    for row in rows {
        writeln!(writer, "{}", serde_json::to_string(row)?)?;
    }
    writer.flush()?;
    Ok(())
}
