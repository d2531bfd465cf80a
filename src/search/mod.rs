//! BLAST-compatible similarity search.
//!
//! [`SearchIndex`] wraps an external BLAST installation: it builds or binds a
//! reference database, executes query sequences against it, and parses the
//! results into typed hit tables. The nucleotide/protein type of the database
//! is fixed at construction and every query is checked for program/database
//! compatibility before a subprocess is spawned.
//!
//! Each query writes its sequence to a uniquely named scoped temporary file
//! that is removed on every exit path, so concurrent queries never share an
//! on-disk resource.

mod error;
mod hits;
mod process;

pub use error::Error;
pub use hits::{Hit, HitTable, RawTable, DEFAULT_COLUMNS};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// All executables a usable BLAST installation provides.
const EXECUTABLES: [&str; 6] = ["blastn", "blastp", "blastx", "tblastn", "tblastx", "makeblastdb"];

/// Sequence type of a search database, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbType {
    Nucleotide,
    Protein,
}

impl DbType {
    /// The `-dbtype` value `makeblastdb` expects.
    fn dbtype_flag(self) -> &'static str {
        match self {
            DbType::Nucleotide => "nucl",
            DbType::Protein => "prot",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::Nucleotide => write!(f, "nucleotide"),
            DbType::Protein => write!(f, "protein"),
        }
    }
}

/// A BLAST query program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Program {
    Blastn,
    Blastp,
    Blastx,
    Tblastn,
    Tblastx,
}

impl Program {
    /// Executable name.
    pub fn name(self) -> &'static str {
        match self {
            Program::Blastn => "blastn",
            Program::Blastp => "blastp",
            Program::Blastx => "blastx",
            Program::Tblastn => "tblastn",
            Program::Tblastx => "tblastx",
        }
    }

    /// The database type this program searches.
    ///
    /// `blastn`, `tblastn`, and `tblastx` read nucleotide databases;
    /// `blastp` and `blastx` read protein databases.
    pub fn database_type(self) -> DbType {
        match self {
            Program::Blastn | Program::Tblastn | Program::Tblastx => DbType::Nucleotide,
            Program::Blastp | Program::Blastx => DbType::Protein,
        }
    }

    /// The query program matching a database type for plain
    /// nucleotide-vs-nucleotide or protein-vs-protein searches.
    pub fn for_db(db_type: DbType) -> Self {
        match db_type {
            DbType::Nucleotide => Program::Blastn,
            DbType::Protein => Program::Blastp,
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings for building a database with `makeblastdb`.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// FASTA file to index.
    pub fasta: PathBuf,
    /// Directory the database files are written to.
    pub output_dir: PathBuf,
    /// Database name; the bound location becomes `output_dir/db_name`.
    pub db_name: String,
    /// Replace an existing binding on the handle.
    pub overwrite: bool,
    /// Extra `makeblastdb` flags as `(flag, value)` pairs; an empty value
    /// emits a bare boolean flag.
    pub extra_args: Vec<(String, String)>,
    /// Kill the builder if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl BuildOptions {
    pub fn new(
        fasta: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        db_name: impl Into<String>,
    ) -> Self {
        Self {
            fasta: fasta.into(),
            output_dir: output_dir.into(),
            db_name: db_name.into(),
            overwrite: false,
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Requested output representation for a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `-outfmt 6` with the [`DEFAULT_COLUMNS`] set, parsed into [`HitTable`].
    #[default]
    Tabular,
    /// `-outfmt 6` with caller-specified columns, parsed into [`RawTable`].
    TabularColumns(Vec<String>),
    /// `-outfmt 15` (single-file JSON), parsed into [`serde_json::Value`].
    Json,
}

/// Settings for a single query invocation.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Output representation; defaults to the typed tabular hit table.
    pub format: OutputFormat,
    /// Extra program flags as `(flag, value)` pairs; an empty value emits a
    /// bare boolean flag.
    pub extra_args: Vec<(String, String)>,
    /// Kill the query if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl QueryOptions {
    pub fn json() -> Self {
        Self {
            format: OutputFormat::Json,
            ..Self::default()
        }
    }

    pub fn columns(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            format: OutputFormat::TabularColumns(columns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Parsed query output, tagged by the requested format.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Typed rows under the default column set.
    Hits(HitTable),
    /// String rows under a caller-specified column set.
    Raw(RawTable),
    /// Nested JSON report.
    Json(serde_json::Value),
}

/// Handle to an on-disk BLAST database.
///
/// The handle owns the bound location but not the FASTA it was built from.
/// After [`build`](Self::build) the location is read-only, so a single handle
/// can serve queries from multiple callers.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    location: Option<PathBuf>,
    db_type: DbType,
    tool_dir: Option<PathBuf>,
}

impl SearchIndex {
    /// An unbound handle; call [`build`](Self::build) before querying.
    pub fn new(db_type: DbType) -> Self {
        Self {
            location: None,
            db_type,
            tool_dir: None,
        }
    }

    /// Binds an existing on-disk database.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the location's parent directory does not
    /// exist.
    pub fn open(location: impl Into<PathBuf>, db_type: DbType) -> Result<Self, Error> {
        let location = location.into();
        let dir = location.parent().unwrap_or(Path::new("."));
        if !dir.is_dir() {
            return Err(Error::Configuration(format!(
                "database directory '{}' does not exist",
                dir.display()
            )));
        }
        Ok(Self {
            location: Some(location),
            db_type,
            tool_dir: None,
        })
    }

    /// Resolves tool executables from an explicit directory instead of `$PATH`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if any BLAST executable is missing from the
    /// directory.
    pub fn with_tool_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        for exe in EXECUTABLES {
            if !dir.join(exe).is_file() {
                return Err(Error::Configuration(format!(
                    "'{}' not found in '{}'; check your BLAST installation",
                    exe,
                    dir.display()
                )));
            }
        }
        self.tool_dir = Some(dir);
        Ok(self)
    }

    /// The bound database location, if any.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// The sequence type of the bound database.
    pub fn db_type(&self) -> DbType {
        self.db_type
    }

    /// Builds a database from a FASTA file and binds its location.
    ///
    /// Invokes `makeblastdb` and blocks until it finishes. Builds are
    /// side-effecting and are never retried automatically.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if the FASTA does not exist (checked before
    ///   any subprocess is spawned)
    /// - [`Error::AlreadyExists`] if a location is bound and
    ///   `options.overwrite` is false
    /// - [`Error::ExternalTool`] with the builder's stderr on non-zero exit
    /// - [`Error::Timeout`] if `options.timeout` expires
    pub fn build(&mut self, options: &BuildOptions) -> Result<(), Error> {
        if !options.fasta.is_file() {
            return Err(Error::Configuration(format!(
                "FASTA file '{}' does not exist",
                options.fasta.display()
            )));
        }
        if let Some(bound) = &self.location {
            if !options.overwrite {
                return Err(Error::AlreadyExists(bound.clone()));
            }
        }

        let target = options.output_dir.join(&options.db_name);
        let mut command = Command::new(self.executable("makeblastdb"));
        command
            .arg("-dbtype")
            .arg(self.db_type.dbtype_flag())
            .arg("-input_type")
            .arg("fasta")
            .arg("-in")
            .arg(&options.fasta)
            .arg("-out")
            .arg(&target);
        append_extra_args(&mut command, &options.extra_args);

        let output = process::run(command, "makeblastdb", options.timeout)?;
        if !output.success() {
            return Err(Error::ExternalTool {
                program: "makeblastdb".to_string(),
                status: output.status,
                stderr: output.stderr_lossy(),
            });
        }

        tracing::debug!(location = %target.display(), db_type = %self.db_type, "database built");
        self.location = Some(target);
        Ok(())
    }

    /// Runs a query sequence against the bound database.
    ///
    /// The sequence is written to a uniquely named temporary FASTA that is
    /// removed on every exit path, including subprocess failure.
    ///
    /// A non-zero tool exit degrades gracefully: the returned
    /// [`Error::ExternalTool`] carries the raw stderr and is logged at
    /// warning level, and the caller may treat it as "no hits" or escalate.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if no database is bound
    /// - [`Error::TypeMismatch`] if `program` searches a different database
    ///   type than the bound one (checked before any subprocess is spawned)
    /// - [`Error::ExternalTool`] / [`Error::Timeout`] from the subprocess
    /// - [`Error::OutputParse`] / [`Error::Json`] if the output cannot be
    ///   parsed as requested
    pub fn query(
        &self,
        sequence: &str,
        program: Program,
        options: &QueryOptions,
    ) -> Result<QueryOutput, Error> {
        let db = self.location.as_ref().ok_or_else(|| {
            Error::Configuration("no database is bound; call build or open first".to_string())
        })?;
        let required = program.database_type();
        if required != self.db_type {
            return Err(Error::TypeMismatch {
                program,
                required,
                actual: self.db_type,
            });
        }

        // Scoped per-call temp file: unique name, deleted on drop.
        let mut query_file = tempfile::Builder::new()
            .prefix("cross-react-query-")
            .suffix(".fasta")
            .tempfile()?;
        write!(query_file, ">query\n{sequence}\n")?;
        query_file.flush()?;

        let mut command = Command::new(self.executable(program.name()));
        command.arg("-db").arg(db).arg("-query").arg(query_file.path());
        match &options.format {
            OutputFormat::Tabular => {
                command.arg("-outfmt").arg(format!("6 {}", DEFAULT_COLUMNS.join(" ")));
            }
            OutputFormat::TabularColumns(columns) => {
                command.arg("-outfmt").arg(format!("6 {}", columns.join(" ")));
            }
            OutputFormat::Json => {
                command.arg("-outfmt").arg("15");
            }
        }
        append_extra_args(&mut command, &options.extra_args);

        let output = process::run(command, program.name(), options.timeout)?;
        if !output.success() {
            let stderr = output.stderr_lossy();
            tracing::warn!(program = %program, status = output.status, stderr = %stderr,
                "search query failed");
            return Err(Error::ExternalTool {
                program: program.name().to_string(),
                status: output.status,
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match &options.format {
            OutputFormat::Tabular => Ok(QueryOutput::Hits(HitTable::parse(&stdout)?)),
            OutputFormat::TabularColumns(columns) => {
                Ok(QueryOutput::Raw(RawTable::parse(&stdout, columns)?))
            }
            OutputFormat::Json => Ok(QueryOutput::Json(serde_json::from_str(&stdout)?)),
        }
    }

    /// Convenience wrapper: default tabular query, typed hit table out.
    pub fn query_table(&self, sequence: &str, program: Program) -> Result<HitTable, Error> {
        match self.query(sequence, program, &QueryOptions::default())? {
            QueryOutput::Hits(table) => Ok(table),
            // Unreachable with the default format, but keep the parser honest.
            other => Err(Error::OutputParse(format!(
                "expected tabular hits, got {other:?}"
            ))),
        }
    }

    fn executable(&self, name: &str) -> PathBuf {
        match &self.tool_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

fn append_extra_args(command: &mut Command, extra: &[(String, String)]) {
    for (flag, value) in extra {
        command.arg(format!("-{flag}"));
        if !value.is_empty() {
            command.arg(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programs_map_to_database_types() {
        assert_eq!(Program::Blastn.database_type(), DbType::Nucleotide);
        assert_eq!(Program::Tblastn.database_type(), DbType::Nucleotide);
        assert_eq!(Program::Tblastx.database_type(), DbType::Nucleotide);
        assert_eq!(Program::Blastp.database_type(), DbType::Protein);
        assert_eq!(Program::Blastx.database_type(), DbType::Protein);
    }

    #[test]
    fn query_checks_type_compatibility_before_spawning() {
        // Bound location is fabricated; a spawn would fail with a different
        // error, so getting TypeMismatch proves the guard runs first.
        let index = SearchIndex::open("/nonexistent/blast/db", DbType::Protein);
        // Parent of the fabricated path does not exist, so bind via a tempdir.
        assert!(index.is_err());

        let dir = tempfile::tempdir().unwrap();
        let index = SearchIndex::open(dir.path().join("db"), DbType::Protein).unwrap();
        let err = index
            .query("ATGCATGC", Program::Blastn, &QueryOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                program: Program::Blastn,
                required: DbType::Nucleotide,
                actual: DbType::Protein,
            }
        ));
    }

    #[test]
    fn query_without_a_bound_database_is_a_configuration_error() {
        let index = SearchIndex::new(DbType::Protein);
        let err = index
            .query("MKT", Program::Blastp, &QueryOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn build_rejects_a_missing_fasta_before_spawning() {
        let mut index = SearchIndex::new(DbType::Protein);
        let err = index
            .build(&BuildOptions::new("/nonexistent/proteome.faa", "/tmp", "db"))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn build_refuses_to_rebind_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("proteome.faa");
        std::fs::write(&fasta, ">ACC1\nMKT\n").unwrap();

        let mut index = SearchIndex::open(dir.path().join("db"), DbType::Protein).unwrap();
        let err = index
            .build(&BuildOptions::new(&fasta, dir.path(), "db"))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn extra_args_support_boolean_flags() {
        let mut command = Command::new("blastp");
        append_extra_args(
            &mut command,
            &[
                ("evalue".to_string(), "1e-5".to_string()),
                ("ungapped".to_string(), String::new()),
            ],
        );
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-evalue", "1e-5", "-ungapped"]);
    }
}
