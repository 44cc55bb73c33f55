//! Append-only audit trail of analysis activity.
//!
//! Entries are stored as JSON Lines. Writing appends one line per entry and
//! never rewrites earlier lines; reading skips lines that do not parse.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::analysis::{ComplianceReport, ContractAnalysis, RiskTier};

/// User recorded when none is set.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Audit log I/O failures.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The log file could not be opened, read or written.
    #[error("Audit log I/O failed for {path}: {source}")]
    Io {
        /// Log file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An entry could not be encoded.
    #[error("Failed to encode audit entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Routine activity.
    Info,
    /// Unusual but non-fatal activity.
    Warning,
    /// A failure.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            _ => Err(format!("Invalid severity: {s}. Use: info, warning, error")),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A document was read for analysis.
    ContractUploaded {
        /// Document identifier.
        document: String,
        /// Size of the input in bytes.
        size_bytes: u64,
        /// Detected contract type, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        contract_type: Option<String>,
    },
    /// A risk analysis pass finished.
    RiskAnalysis {
        /// Document identifier.
        document: String,
        /// Number of scored clauses.
        clause_count: usize,
        /// Contract-level risk.
        overall_risk: RiskTier,
        /// High-risk clause count.
        high_risk_clauses: usize,
        /// Medium-risk clause count.
        medium_risk_clauses: usize,
    },
    /// A compliance check finished.
    ComplianceCheck {
        /// Document identifier.
        document: String,
        /// Missing rules.
        missing_clauses: usize,
        /// Rules checked.
        total_checks: usize,
        /// Share of satisfied rules, rounded to two decimals.
        compliance_percentage: f64,
    },
    /// A report was rendered.
    ReportGenerated {
        /// Document identifier.
        document: String,
        /// Output format.
        format: String,
    },
    /// Data left the tool.
    DataExported {
        /// Document or batch identifier.
        document: String,
        /// Output format.
        format: String,
        /// Number of exported records.
        record_count: usize,
    },
    /// Something failed.
    Error {
        /// Error message.
        message: String,
        /// Where it happened.
        context: String,
    },
}

impl AuditEvent {
    /// Snake-case event name, as stored in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ContractUploaded { .. } => "contract_uploaded",
            Self::RiskAnalysis { .. } => "risk_analysis",
            Self::ComplianceCheck { .. } => "compliance_check",
            Self::ReportGenerated { .. } => "report_generated",
            Self::DataExported { .. } => "data_exported",
            Self::Error { .. } => "error",
        }
    }

    /// Severity recorded for the event.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Error { .. } => Severity::Error,
            _ => Severity::Info,
        }
    }

    /// Event summarizing a finished analysis.
    pub fn risk_analysis(analysis: &ContractAnalysis) -> Self {
        Self::RiskAnalysis {
            document: analysis.document_id.clone(),
            clause_count: analysis.clauses.len(),
            overall_risk: analysis.verdict.overall_risk,
            high_risk_clauses: analysis.verdict.high_count,
            medium_risk_clauses: analysis.verdict.medium_count,
        }
    }

    /// Event summarizing a compliance report.
    pub fn compliance_check(document: &str, report: &ComplianceReport) -> Self {
        Self::ComplianceCheck {
            document: document.to_string(),
            missing_clauses: report.missing_count,
            total_checks: report.total_checks,
            compliance_percentage: (report.compliance_percentage() * 100.0).round() / 100.0,
        }
    }
}

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique id, `<session>-<sequence>`.
    pub id: String,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// Session that wrote the entry.
    pub session_id: String,
    /// Entry severity.
    pub severity: Severity,
    /// Acting user.
    pub user: String,
    /// Event payload.
    pub event: AuditEvent,
}

/// Criteria for selecting entries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    /// Event kind, e.g. `risk_analysis`.
    pub event_type: Option<String>,
    /// Exact severity.
    pub severity: Option<Severity>,
    /// Exact session id.
    pub session_id: Option<String>,
    /// Earliest timestamp, inclusive.
    pub since: Option<DateTime<Utc>>,
    /// Latest timestamp, inclusive.
    pub until: Option<DateTime<Utc>>,
}

impl AuditFilter {
    /// Returns true if `entry` satisfies every set criterion.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.event_type
            .as_deref()
            .map_or(true, |kind| entry.event.kind() == kind)
            && self.severity.map_or(true, |s| entry.severity == s)
            && self
                .session_id
                .as_deref()
                .map_or(true, |id| entry.session_id == id)
            && self.since.map_or(true, |since| entry.timestamp >= since)
            && self.until.map_or(true, |until| entry.timestamp <= until)
    }
}

/// Aggregate view of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Number of readable entries.
    pub total_events: usize,
    /// Entries with `ERROR` severity.
    pub total_errors: usize,
    /// Entry count per event kind.
    pub event_types: BTreeMap<String, usize>,
    /// Errors as a percentage of all entries, rounded to two decimals.
    pub error_rate_percent: f64,
    /// Timestamp of the first entry.
    pub first_event: Option<DateTime<Utc>>,
    /// Timestamp of the last entry.
    pub last_event: Option<DateTime<Utc>>,
}

/// Writer and reader for one audit log file.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    session_id: String,
    user: String,
    sequence: AtomicU64,
}

impl AuditLog {
    /// Opens (creating if needed) the log at `path` and starts a new session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| AuditError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;

        let session_id = Uuid::new_v4().to_string();
        debug!(path = %path.display(), session_id = %session_id, "Opened audit log");

        Ok(Self {
            path,
            session_id,
            user: ANONYMOUS_USER.to_string(),
            sequence: AtomicU64::new(0),
        })
    }

    /// Sets the user recorded on subsequent entries.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Id of the session this log writes under.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Appends an entry for `event`.
    pub fn record(&self, event: AuditEvent) -> Result<AuditEntry, AuditError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = AuditEntry {
            id: format!("{}-{sequence}", self.session_id),
            timestamp: Utc::now(),
            session_id: self.session_id.clone(),
            severity: event.severity(),
            user: self.user.clone(),
            event,
        };

        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let io_err = |source| AuditError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).map_err(io_err)?;

        debug!(id = %entry.id, kind = entry.event.kind(), "Recorded audit entry");
        Ok(entry)
    }

    /// Records an error event.
    pub fn record_error(&self, message: &str, context: &str) -> Result<AuditEntry, AuditError> {
        self.record(AuditEvent::Error {
            message: message.to_string(),
            context: context.to_string(),
        })
    }

    /// Reads all readable entries in file order.
    pub fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AuditError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut entries = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = line_no + 1,
                    error = %e,
                    "Skipping malformed audit entry"
                ),
            }
        }
        Ok(entries)
    }

    /// Entries matching `filter`.
    pub fn filter(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, AuditError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect())
    }

    /// Entries written by this session.
    pub fn session_entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        self.filter(&AuditFilter {
            session_id: Some(self.session_id.clone()),
            ..AuditFilter::default()
        })
    }

    /// Aggregates the whole log.
    pub fn summary(&self) -> Result<AuditSummary, AuditError> {
        let entries = self.entries()?;
        let mut event_types = BTreeMap::new();
        for entry in &entries {
            *event_types.entry(entry.event.kind().to_string()).or_insert(0) += 1;
        }
        let total_errors = entries
            .iter()
            .filter(|entry| entry.severity == Severity::Error)
            .count();

        #[allow(clippy::cast_precision_loss)]
        let error_rate_percent = if entries.is_empty() {
            0.0
        } else {
            (total_errors as f64 / entries.len() as f64 * 10_000.0).round() / 100.0
        };

        Ok(AuditSummary {
            total_events: entries.len(),
            total_errors,
            event_types,
            error_rate_percent,
            first_event: entries.first().map(|e| e.timestamp),
            last_event: entries.last().map(|e| e.timestamp),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashSet;

    use tempfile::TempDir;

    use super::*;

    fn open_log(dir: &TempDir) -> AuditLog {
        AuditLog::open(dir.path().join("logs").join("audit.jsonl")).unwrap()
    }

    fn report_event(document: &str) -> AuditEvent {
        AuditEvent::ReportGenerated {
            document: document.to_string(),
            format: "markdown".to_string(),
        }
    }

    #[test]
    fn ids_are_unique_and_sequential() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        let first = log.record(report_event("a.txt")).unwrap();
        let second = log.record(report_event("b.txt")).unwrap();
        assert_eq!(first.id, format!("{}-1", log.session_id()));
        assert_eq!(second.id, format!("{}-2", log.session_id()));

        let other = open_log(&dir);
        assert_ne!(other.session_id(), log.session_id());
        other.record(report_event("c.txt")).unwrap();
        assert!(Uuid::parse_str(other.session_id()).is_ok());

        let ids: HashSet<String> = log.entries().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn logs_opened_back_to_back_get_distinct_sessions() {
        let dir = TempDir::new().unwrap();
        let sessions: HashSet<String> = (0..64)
            .map(|_| open_log(&dir).session_id().to_string())
            .collect();
        assert_eq!(sessions.len(), 64);

        let entry = open_log(&dir).record(report_event("a.txt")).unwrap();
        let (session, sequence) = entry.id.rsplit_once('-').unwrap();
        assert_eq!(Uuid::parse_str(session).unwrap().get_version_num(), 4);
        assert_eq!(sequence, "1");
    }

    #[test]
    fn appends_without_rewriting() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        log.record(report_event("a.txt")).unwrap();
        let before = fs::read_to_string(log.path()).unwrap();
        log.record_error("boom", "batch").unwrap();
        let after = fs::read_to_string(log.path()).unwrap();
        assert!(after.starts_with(&before));
        assert_eq!(after.lines().count(), 2);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        log.record(report_event("a.txt")).unwrap();
        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        writeln!(file, "{{not json").unwrap();
        log.record(report_event("b.txt")).unwrap();

        assert_eq!(log.entries().unwrap().len(), 2);
    }

    #[test]
    fn filter_and_summary() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir).with_user("analyst");
        log.record(report_event("a.txt")).unwrap();
        log.record(AuditEvent::DataExported {
            document: "batch".to_string(),
            format: "json".to_string(),
            record_count: 4,
        })
        .unwrap();
        log.record_error("unreadable file", "batch").unwrap();

        let errors = log
            .filter(&AuditFilter {
                severity: Some(Severity::Error),
                ..AuditFilter::default()
            })
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].user, "analyst");

        let reports = log
            .filter(&AuditFilter {
                event_type: Some("report_generated".to_string()),
                ..AuditFilter::default()
            })
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(log.session_entries().unwrap().len(), 3);

        let summary = log.summary().unwrap();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.total_errors, 1);
        assert_eq!(summary.event_types["data_exported"], 1);
        assert!((summary.error_rate_percent - 33.33).abs() < 1e-9);
        assert!(summary.first_event <= summary.last_event);
    }

    #[test]
    fn empty_log_summary() {
        let dir = TempDir::new().unwrap();
        let summary = open_log(&dir).summary().unwrap();
        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.error_rate_percent, 0.0);
        assert!(summary.first_event.is_none());
    }

    #[test]
    fn entry_json_shape() {
        let dir = TempDir::new().unwrap();
        let log = open_log(&dir);
        log.record(AuditEvent::RiskAnalysis {
            document: "msa.txt".to_string(),
            clause_count: 12,
            overall_risk: RiskTier::High,
            high_risk_clauses: 1,
            medium_risk_clauses: 3,
        })
        .unwrap();
        let line = fs::read_to_string(log.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["severity"], "INFO");
        assert_eq!(value["user"], "anonymous");
        assert_eq!(value["event"]["type"], "risk_analysis");
        assert_eq!(value["event"]["overall_risk"], "High");
    }

    #[test]
    fn severity_parsing() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("fatal".parse::<Severity>().is_err());
    }
}
