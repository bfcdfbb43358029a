//! Snapshot quality report
//!
//! Answers "can this stored snapshot still be replayed?" before anyone
//! tries to. The report never fails; a snapshot that does not even parse
//! comes back `critical` with the matching issues filled in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ui_tree::{keys, UiTree};

use crate::model::Snapshot;

pub const MIN_DOCUMENT_BYTES: usize = 100;
pub const MAX_DOCUMENT_BYTES: usize = 2 * 1024 * 1024;
pub const EXPECTED_ROOT_TAG: &str = "hierarchy";

/// Tolerated clock skew between capturing host and checking host.
const FUTURE_SKEW_HOURS: i64 = 24;
const PASS_RATIO: f64 = 0.8;

// content, parse, device, page, timestamp, size, structure
const WEIGHTS: [u32; 7] = [25, 25, 15, 10, 5, 15, 15];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthSeverity {
    Critical,
    Major,
    Minor,
    Passed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthIssue {
    pub code: String,
    pub message: String,
    pub level: IssueLevel,
    pub suggestion: String,
}

impl HealthIssue {
    fn new(code: &str, level: IssueLevel, message: impl Into<String>, suggestion: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            level,
            suggestion: suggestion.to_string(),
        }
    }
}

/// Individual check outcomes.
///
/// `hierarchy_root` is advisory: it raises a warning but does not count
/// towards severity or score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    pub has_document: bool,
    pub parses: bool,
    pub has_device_id: bool,
    pub has_page_title: bool,
    pub timestamp_ok: bool,
    pub size_ok: bool,
    pub has_bounds: bool,
    pub hierarchy_root: bool,
}

impl HealthChecks {
    fn weighted(&self) -> [bool; 7] {
        [
            self.has_document,
            self.parses,
            self.has_device_id,
            self.has_page_title,
            self.timestamp_ok,
            self.size_ok,
            self.has_bounds,
        ]
    }

    /// Weighted points, scaled to 0..=100.
    pub fn score(&self) -> u8 {
        let total: u32 = WEIGHTS.iter().sum();
        let earned: u32 = self
            .weighted()
            .iter()
            .zip(WEIGHTS)
            .filter(|(passed, _)| **passed)
            .map(|(_, weight)| weight)
            .sum();
        (f64::from(earned) * 100.0 / f64::from(total)).round() as u8
    }

    pub fn severity(&self) -> HealthSeverity {
        if !self.has_document || !self.parses {
            return HealthSeverity::Critical;
        }
        if !self.size_ok || !self.has_bounds {
            return HealthSeverity::Major;
        }
        let checks = self.weighted();
        let passed = checks.iter().filter(|passed| **passed).count();
        if passed as f64 / checks.len() as f64 >= PASS_RATIO {
            HealthSeverity::Passed
        } else {
            HealthSeverity::Minor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHealth {
    pub checks: HealthChecks,
    pub issues: Vec<HealthIssue>,
    pub severity: HealthSeverity,
    pub score: u8,
}

impl SnapshotHealth {
    /// Anything short of critical can still be replayed.
    pub fn is_valid(&self) -> bool {
        self.severity != HealthSeverity::Critical
    }
}

pub fn check_health(snapshot: &Snapshot) -> SnapshotHealth {
    check_health_at(snapshot, Utc::now())
}

/// Same as [`check_health`] with an explicit clock.
pub fn check_health_at(snapshot: &Snapshot, now: DateTime<Utc>) -> SnapshotHealth {
    let text = &snapshot.document_text;
    let tree = UiTree::parse(text).ok();
    let context = snapshot.source_context.as_ref();
    let present = |value: Option<&String>| value.map_or(false, |v| !v.trim().is_empty());

    let checks = HealthChecks {
        has_document: !text.trim().is_empty(),
        parses: tree.is_some(),
        has_device_id: present(context.and_then(|c| c.device_id.as_ref())),
        has_page_title: present(context.and_then(|c| c.page_title.as_ref())),
        timestamp_ok: snapshot.captured_at <= now + Duration::hours(FUTURE_SKEW_HOURS),
        size_ok: text.len() > MIN_DOCUMENT_BYTES && text.len() < MAX_DOCUMENT_BYTES,
        has_bounds: tree.as_ref().map_or(false, |tree| {
            tree.node_ids()
                .any(|id| tree.node(id).and_then(|n| n.attr(keys::BOUNDS)).is_some())
        }),
        hierarchy_root: tree.as_ref().map_or(false, |tree| {
            tree.node(tree.root())
                .map_or(false, |root| root.tag() == EXPECTED_ROOT_TAG)
        }),
    };

    let issues = collect_issues(&checks, text.len());
    let health = SnapshotHealth {
        severity: checks.severity(),
        score: checks.score(),
        checks,
        issues,
    };
    debug!(
        hash = %snapshot.hash,
        severity = ?health.severity,
        score = health.score,
        issues = health.issues.len(),
        "snapshot health checked"
    );
    health
}

fn collect_issues(checks: &HealthChecks, size: usize) -> Vec<HealthIssue> {
    let mut issues = Vec::new();

    if !checks.has_document {
        issues.push(HealthIssue::new(
            "MISSING_DOCUMENT",
            IssueLevel::Error,
            "document text is missing or blank",
            "save the hierarchy dump together with the step",
        ));
    } else if !checks.parses {
        issues.push(HealthIssue::new(
            "INVALID_DOCUMENT",
            IssueLevel::Error,
            "document text does not parse as a hierarchy dump",
            "check the stored text for truncation or encoding damage",
        ));
    }
    if checks.parses && !checks.hierarchy_root {
        issues.push(HealthIssue::new(
            "UNEXPECTED_ROOT",
            IssueLevel::Warning,
            format!("root element is not <{}>", EXPECTED_ROOT_TAG),
            "make sure the dump came from a UI hierarchy dump command",
        ));
    }
    if !checks.has_device_id {
        issues.push(HealthIssue::new(
            "MISSING_DEVICE_INFO",
            IssueLevel::Warning,
            "source context has no device id",
            "record the device id to keep snapshots comparable across devices",
        ));
    }
    if !checks.has_page_title {
        issues.push(HealthIssue::new(
            "MISSING_PAGE_INFO",
            IssueLevel::Warning,
            "source context has no page title",
            "record the page title so the snapshot can be traced to a screen",
        ));
    }
    if !checks.timestamp_ok {
        issues.push(HealthIssue::new(
            "FUTURE_TIMESTAMP",
            IssueLevel::Info,
            "capture time lies in the future",
            "check the clock of the capturing host",
        ));
    }
    if checks.has_document && !checks.size_ok {
        if size <= MIN_DOCUMENT_BYTES {
            issues.push(HealthIssue::new(
                "DOCUMENT_TOO_SMALL",
                IssueLevel::Warning,
                format!("document is only {} bytes and may be incomplete", size),
                "capture the full page hierarchy",
            ));
        } else {
            issues.push(HealthIssue::new(
                "DOCUMENT_TOO_LARGE",
                IssueLevel::Warning,
                format!("document is {} KB", size / 1024),
                "trim the dump or store it compressed",
            ));
        }
    }
    if checks.parses && !checks.has_bounds {
        issues.push(HealthIssue::new(
            "MISSING_BOUNDS",
            IssueLevel::Warning,
            "no node carries a bounds attribute",
            "make sure the dump came from a UI hierarchy dump command",
        ));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceContext;

    const DOC: &str = r#"<hierarchy rotation="0">
  <node class="android.widget.FrameLayout" package="com.app" bounds="[0,0][1080,1920]">
    <node class="android.widget.Button" text="Follow" bounds="[800,100][1040,200]"/>
  </node>
</hierarchy>"#;

    fn context() -> SourceContext {
        SourceContext {
            device_id: Some("emulator-5554".into()),
            page_title: Some("Profile".into()),
            ..Default::default()
        }
    }

    fn codes(health: &SnapshotHealth) -> Vec<&str> {
        health.issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn complete_snapshot_passes() {
        let health = check_health(&Snapshot::capture(DOC, Some(context())));
        assert_eq!(health.severity, HealthSeverity::Passed);
        assert_eq!(health.score, 100);
        assert!(health.issues.is_empty());
        assert!(health.is_valid());
    }

    #[test]
    fn missing_context_is_minor() {
        let health = check_health(&Snapshot::capture(DOC, None));
        // 5 of 7 checks pass, below the 80% line
        assert_eq!(health.severity, HealthSeverity::Minor);
        assert_eq!(health.score, 77);
        assert_eq!(codes(&health), ["MISSING_DEVICE_INFO", "MISSING_PAGE_INFO"]);
    }

    #[test]
    fn unparseable_or_blank_is_critical() {
        let broken = check_health(&Snapshot::capture("<hierarchy><node>", Some(context())));
        assert_eq!(broken.severity, HealthSeverity::Critical);
        assert!(!broken.is_valid());
        assert!(codes(&broken).contains(&"INVALID_DOCUMENT"));

        let blank = check_health(&Snapshot::capture("   ", Some(context())));
        assert_eq!(blank.severity, HealthSeverity::Critical);
        assert_eq!(codes(&blank), ["MISSING_DOCUMENT"]);
    }

    #[test]
    fn tiny_or_boundless_document_is_major() {
        let tiny = check_health(&Snapshot::capture(
            r#"<hierarchy><node bounds="[0,0][1,1]"/></hierarchy>"#,
            Some(context()),
        ));
        assert_eq!(tiny.severity, HealthSeverity::Major);
        assert_eq!(codes(&tiny), ["DOCUMENT_TOO_SMALL"]);

        let boundless = DOC.replace(" bounds=\"[0,0][1080,1920]\"", "").replace(
            " bounds=\"[800,100][1040,200]\"",
            " resource-id=\"com.app:id/btn_follow_with_padding\"",
        );
        let health = check_health(&Snapshot::capture(boundless, Some(context())));
        assert_eq!(health.severity, HealthSeverity::Major);
        assert!(codes(&health).contains(&"MISSING_BOUNDS"));
    }

    #[test]
    fn foreign_root_is_only_a_warning() {
        let doc = DOC.replace("hierarchy", "dump");
        let health = check_health(&Snapshot::capture(doc, Some(context())));
        assert_eq!(health.severity, HealthSeverity::Passed);
        assert_eq!(health.score, 100);
        assert_eq!(codes(&health), ["UNEXPECTED_ROOT"]);
    }

    #[test]
    fn future_capture_time_beyond_skew() {
        let snapshot = Snapshot::capture(DOC, Some(context()));
        let within = snapshot.captured_at - Duration::hours(23);
        assert!(check_health_at(&snapshot, within).checks.timestamp_ok);

        let beyond = snapshot.captured_at - Duration::hours(25);
        let health = check_health_at(&snapshot, beyond);
        assert!(!health.checks.timestamp_ok);
        assert_eq!(health.severity, HealthSeverity::Passed);
        assert_eq!(health.score, 95);
        assert_eq!(codes(&health), ["FUTURE_TIMESTAMP"]);
    }
}
