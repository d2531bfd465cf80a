use super::error::Error;
use serde::{Deserialize, Serialize};

/// The default tabular column set requested from the search engine.
///
/// Matches BLAST's `-outfmt 6` defaults with accession-versioned identifiers.
pub const DEFAULT_COLUMNS: [&str; 12] = [
    "qaccver", "saccver", "pident", "length", "mismatch", "gapopen", "qstart", "qend", "sstart",
    "send", "evalue", "bitscore",
];

/// One row of tabular search output under the default column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Query accession.
    pub query: String,
    /// Subject (matched) accession.
    pub subject: String,
    /// Percentage of identical positions.
    pub percent_identity: f64,
    /// Alignment length.
    pub length: u32,
    /// Number of mismatches.
    pub mismatches: u32,
    /// Number of gap openings.
    pub gap_opens: u32,
    /// Start of alignment in query (1-based).
    pub query_start: u32,
    /// End of alignment in query.
    pub query_end: u32,
    /// Start of alignment in subject.
    pub subject_start: u32,
    /// End of alignment in subject.
    pub subject_end: u32,
    /// Expect value.
    pub evalue: f64,
    /// Normalized alignment score; the ranking criterion for best-hit
    /// selection.
    pub bit_score: f64,
}

/// Parsed tabular search output.
///
/// The engine makes no ordering guarantee; ranking is the consumer's
/// responsibility and is always bit-score descending in this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitTable {
    /// Rows in the order the engine emitted them.
    pub hits: Vec<Hit>,
}

impl HitTable {
    /// Parses `-outfmt 6` tabular text under the default column set.
    ///
    /// Blank lines are skipped. Any row with a wrong field count or an
    /// unparseable numeric field is an [`Error::OutputParse`].
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut hits = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            hits.push(Hit::parse_row(line, lineno + 1)?);
        }
        Ok(Self { hits })
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// All rows tied for the maximum bit-score.
    ///
    /// Ties are kept, never arbitrarily broken: dropping an equally-scored
    /// homolog would silently discard signal from the analysis. Returns an
    /// empty slice-like vector when the table is empty.
    pub fn best_hits(&self) -> Vec<&Hit> {
        let max = self
            .hits
            .iter()
            .map(|h| h.bit_score)
            .fold(f64::NEG_INFINITY, f64::max);
        self.hits.iter().filter(|h| h.bit_score == max).collect()
    }

    /// Subject accessions of the best hits, deduplicated in first-seen order.
    pub fn best_accessions(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for hit in self.best_hits() {
            if !seen.contains(&hit.subject.as_str()) {
                seen.push(hit.subject.as_str());
            }
        }
        seen
    }
}

impl Hit {
    fn parse_row(line: &str, lineno: usize) -> Result<Self, Error> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != DEFAULT_COLUMNS.len() {
            return Err(Error::OutputParse(format!(
                "line {lineno}: expected {} tab-separated fields, found {}",
                DEFAULT_COLUMNS.len(),
                fields.len()
            )));
        }
        let num = |idx: usize| -> Result<f64, Error> {
            fields[idx].parse().map_err(|_| {
                Error::OutputParse(format!(
                    "line {lineno}: field '{}' is not numeric ({})",
                    DEFAULT_COLUMNS[idx], fields[idx]
                ))
            })
        };
        let int = |idx: usize| -> Result<u32, Error> {
            fields[idx].parse().map_err(|_| {
                Error::OutputParse(format!(
                    "line {lineno}: field '{}' is not an integer ({})",
                    DEFAULT_COLUMNS[idx], fields[idx]
                ))
            })
        };
        Ok(Self {
            query: fields[0].to_string(),
            subject: fields[1].to_string(),
            percent_identity: num(2)?,
            length: int(3)?,
            mismatches: int(4)?,
            gap_opens: int(5)?,
            query_start: int(6)?,
            query_end: int(7)?,
            subject_start: int(8)?,
            subject_end: int(9)?,
            evalue: num(10)?,
            bit_score: num(11)?,
        })
    }
}

/// Tabular output under a caller-specified column set.
///
/// Custom columns are passed to the engine verbatim, so rows are kept as
/// strings in column order rather than forced into [`Hit`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names as requested.
    pub columns: Vec<String>,
    /// One entry per row, fields in column order.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub(crate) fn parse(text: &str, columns: &[String]) -> Result<Self, Error> {
        let mut rows = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
            if fields.len() != columns.len() {
                return Err(Error::OutputParse(format!(
                    "line {}: expected {} fields for the requested columns, found {}",
                    lineno + 1,
                    columns.len(),
                    fields.len()
                )));
            }
            rows.push(fields);
        }
        Ok(Self {
            columns: columns.to_vec(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "query\tACC1\t100.000\t40\t0\t0\t1\t40\t1\t40\t2e-25\t85.5\n\
                          query\tACC2\t95.000\t40\t2\t0\t1\t40\t1\t40\t8e-23\t77.8\n\
                          query\tACC3\t100.000\t40\t0\t0\t1\t40\t1\t40\t2e-25\t85.5\n";

    #[test]
    fn parses_default_tabular_output() {
        let table = HitTable::parse(SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.hits[0].subject, "ACC1");
        assert_eq!(table.hits[0].percent_identity, 100.0);
        assert_eq!(table.hits[0].length, 40);
        assert_eq!(table.hits[1].bit_score, 77.8);
        assert_eq!(table.hits[2].evalue, 2e-25);
    }

    #[test]
    fn empty_output_is_an_empty_table() {
        let table = HitTable::parse("\n\n").unwrap();
        assert!(table.is_empty());
        assert!(table.best_hits().is_empty());
    }

    #[test]
    fn best_hits_keep_all_ties() {
        let table = HitTable::parse(SAMPLE).unwrap();
        let best = table.best_hits();
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].subject, "ACC1");
        assert_eq!(best[1].subject, "ACC3");
        assert_eq!(table.best_accessions(), vec!["ACC1", "ACC3"]);
    }

    #[test]
    fn malformed_row_is_a_parse_error() {
        let err = HitTable::parse("query\tACC1\tnot-a-number\n").unwrap_err();
        assert!(matches!(err, Error::OutputParse(_)));
    }

    #[test]
    fn raw_table_respects_requested_columns() {
        let cols = vec!["saccver".to_string(), "bitscore".to_string()];
        let raw = RawTable::parse("ACC1\t85.5\nACC2\t77.8\n", &cols).unwrap();
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[0], vec!["ACC1", "85.5"]);

        let err = RawTable::parse("ACC1\n", &cols).unwrap_err();
        assert!(matches!(err, Error::OutputParse(_)));
    }
}
