//! Writer and parser for the download table.
//!
//! ```text
//! # Generated by coexgraph
//! # 2026/3/7 9:05
//! # Fields are separated by tabs
//! Query Gene	Query Gene NCBI Id	Coexpressed Gene	...
//! RPL3	6122	RPL4	6124	0.1235	12	0	40
//! ```
//!
//! The "Datasets tested" column is only written for full searches; the
//! server does not count it for query-genes-only results. Missing values are
//! written as empty fields.

use std::io;

use chrono::{DateTime, Local};
use coexgraph_common::entities::{round4, CoexpressionResult};
use coexgraph_common::error::{CoexError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

const BASE_COLUMNS: [&str; 7] = [
    "Query Gene",
    "Query Gene NCBI Id",
    "Coexpressed Gene",
    "Coexpressed Gene NCBI Id",
    "Specificity",
    "Positive Support",
    "Negative Support",
];
const TESTED_COLUMN: &str = "Datasets tested";

/// Comment block written before the header.
#[derive(Debug, Clone)]
pub struct ExportPreamble {
    pub generator: String,
    pub generated_at: DateTime<Local>,
}

impl ExportPreamble {
    pub fn now(generator: impl Into<String>) -> Self {
        Self { generator: generator.into(), generated_at: Local::now() }
    }

    fn lines(&self) -> Vec<String> {
        vec![
            format!("Generated by {}", self.generator),
            self.generated_at.format("%Y/%-m/%-d %-H:%M").to_string(),
            String::new(),
            "The file format may change in the near future.".to_string(),
            "Fields are separated by tabs".to_string(),
            String::new(),
        ]
    }
}

/// One parsed data row. Field names follow the table header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Query Gene")]
    pub query_symbol: String,
    #[serde(rename = "Query Gene NCBI Id")]
    pub query_ncbi_id: Option<String>,
    #[serde(rename = "Coexpressed Gene")]
    pub found_symbol: String,
    #[serde(rename = "Coexpressed Gene NCBI Id")]
    pub found_ncbi_id: Option<String>,
    #[serde(rename = "Specificity")]
    pub specificity: Option<f64>,
    #[serde(rename = "Positive Support")]
    pub positive_support: u32,
    #[serde(rename = "Negative Support")]
    pub negative_support: u32,
    #[serde(rename = "Datasets tested", default)]
    pub datasets_tested: Option<u32>,
}

pub fn write_table(
    results: &[CoexpressionResult],
    query_genes_only: bool,
    preamble: Option<&ExportPreamble>,
) -> Result<String> {
    let mut out = String::new();
    if let Some(p) = preamble {
        for line in p.lines() {
            out.push_str(&format!("# {line}\n"));
        }
    }

    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(Vec::new());
    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if !query_genes_only {
        header.push(TESTED_COLUMN);
    }
    writer.write_record(&header).map_err(io::Error::from)?;

    for r in results {
        let mut row = vec![
            r.query_gene.symbol.clone(),
            r.query_gene.ncbi_id.clone().unwrap_or_default(),
            r.found_gene.symbol.clone(),
            r.found_gene.ncbi_id.clone().unwrap_or_default(),
            r.specificity().map(|s| round4(s).to_string()).unwrap_or_default(),
            r.positive_support.to_string(),
            r.negative_support.to_string(),
        ];
        if !query_genes_only {
            row.push(r.num_tested_in.map(|n| n.to_string()).unwrap_or_default());
        }
        writer.write_record(&row).map_err(io::Error::from)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let body = String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    out.push_str(&body);
    debug!(rows = results.len(), query_genes_only, "Wrote export table");
    Ok(out)
}

/// Parse a table produced by [`write_table`]. Comment and blank lines before
/// the header are skipped; the header decides whether the tested column is
/// present.
pub fn parse_table(text: &str) -> Result<Vec<ExportRow>> {
    let (skipped, body) = split_preamble(text);
    let mut reader = ReaderBuilder::new().delimiter(b'\t').from_reader(body.as_bytes());

    let header_line = skipped + 1;
    let header = reader.headers().map_err(|e| parse_error(skipped, e))?.clone();
    if header.is_empty() {
        return Err(CoexError::ExportParse { line: 0, message: "missing header".into() });
    }
    check_header(&header, header_line)?;

    reader
        .deserialize::<ExportRow>()
        .map(|row| row.map_err(|e| parse_error(skipped, e)))
        .collect()
}

/// Count and drop the leading `#` and blank lines.
fn split_preamble(text: &str) -> (usize, &str) {
    let mut rest = text;
    let mut skipped = 0;
    while let Some(line) = rest.lines().next() {
        if !(line.starts_with('#') || line.trim().is_empty()) {
            break;
        }
        rest = rest.split_once('\n').map_or("", |(_, tail)| tail);
        skipped += 1;
    }
    (skipped, rest)
}

fn check_header(header: &StringRecord, line: usize) -> Result<()> {
    let columns: Vec<&str> = header.iter().collect();
    let ok = match columns.len() {
        7 => true,
        8 => columns[7] == TESTED_COLUMN,
        _ => false,
    };
    if !ok || columns[..7] != BASE_COLUMNS {
        return Err(CoexError::ExportParse {
            line,
            message: format!("unexpected header: {}", columns.join(", ")),
        });
    }
    Ok(())
}

fn parse_error(skipped: usize, e: csv::Error) -> CoexError {
    let line = e.position().map_or(skipped, |p| skipped + p.line() as usize);
    CoexError::ExportParse { line, message: e.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use coexgraph_common::entities::Gene;
    use pretty_assertions::assert_eq;

    fn result() -> CoexpressionResult {
        CoexpressionResult::new(
            Gene::new(1, "RPL3").with_ncbi_id("6122").with_node_degree(0.123456),
            Gene::new(2, "RPL4").with_ncbi_id("6124").with_node_degree(0.05),
            12,
            0,
        )
        .with_num_tested_in(40)
    }

    #[test]
    fn test_full_search_has_tested_column() {
        let text = write_table(&[result()], false, None).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().ends_with("\tDatasets tested"));
        assert_eq!(lines.next().unwrap(), "RPL3\t6122\tRPL4\t6124\t0.1235\t12\t0\t40");
    }

    #[test]
    fn test_query_genes_only_omits_tested_column() {
        let text = write_table(&[result()], true, None).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header.split('\t').count(), 7);
        let rows = parse_table(&text).unwrap();
        assert_eq!(rows[0].datasets_tested, None);
    }

    #[test]
    fn test_preamble_is_commented_and_skipped() {
        let preamble = ExportPreamble {
            generator: "coexgraph".into(),
            generated_at: Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 0).unwrap(),
        };
        let text = write_table(&[result()], false, Some(&preamble)).unwrap();
        assert!(text.starts_with("# Generated by coexgraph\n# 2026/3/7 9:05\n"));
        let rows = parse_table(&text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].query_ncbi_id.as_deref(), Some("6122"));
        assert_eq!(rows[0].specificity, Some(0.1235));
        assert_eq!(rows[0].datasets_tested, Some(40));
    }

    #[test]
    fn test_missing_values_are_empty_fields() {
        let r = CoexpressionResult::new(Gene::new(1, "A"), Gene::new(2, "B"), 0, 3);
        let text = write_table(&[r], false, None).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), "A\t\tB\t\t\t0\t3\t");
        let rows = parse_table(&text).unwrap();
        assert_eq!(rows[0].found_ncbi_id, None);
        assert_eq!(rows[0].specificity, None);
        assert_eq!(rows[0].negative_support, 3);
    }

    #[test]
    fn test_parse_errors_carry_line_number() {
        let text = format!("{}\nA\t1\tB\t2\t0.1\tx\t0\n", BASE_COLUMNS.join("\t"));
        match parse_table(&text) {
            Err(CoexError::ExportParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
        assert!(parse_table("# only comments\n").is_err());
        assert!(parse_table("Gene\tOther\n").is_err());
    }

    #[test]
    fn test_symbol_with_tab_is_quoted() {
        let r = CoexpressionResult::new(Gene::new(1, "A\tB"), Gene::new(2, "C"), 4, 0);
        let text = write_table(&[r], true, None).unwrap();
        assert_eq!(text.lines().nth(1).unwrap(), "\"A\tB\"\t\tC\t\t\t4\t0");
        let rows = parse_table(&text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].query_symbol, "A\tB");
        assert_eq!(rows[0].found_symbol, "C");
    }

    #[test]
    fn test_hash_symbol_after_header_is_data() {
        let rows_in = vec![
            CoexpressionResult::new(Gene::new(1, "#A"), Gene::new(2, "B"), 3, 1),
            CoexpressionResult::new(Gene::new(3, "C"), Gene::new(4, "#D"), 2, 0),
        ];
        let preamble = ExportPreamble::now("coexgraph");
        let text = write_table(&rows_in, false, Some(&preamble)).unwrap();
        let rows = parse_table(&text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].query_symbol, "#A");
        assert_eq!(rows[1].found_symbol, "#D");
    }
}
