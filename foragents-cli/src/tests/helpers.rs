//! Test helpers for laying out entity and counter fixtures on disk.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeZone, Utc};
use foragents_core::{CounterMap, EngagementCounters};
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}

pub(super) fn scoring_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0)
        .single()
        .expect("valid instant")
}

/// Temporary catalogue with three entities and engagement for two of them.
pub(super) struct CatalogueFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl CatalogueFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        write_utf8(
            &root.join("entities.json"),
            br#"[
                {"id": "mcp-git"},
                {"id": "agent-notes", "tags": ["notes"]},
                {"id": "skill-lint", "verified": true}
            ]"#,
        );
        write_utf8(
            &root.join("counters.json"),
            br#"{
                "agent-notes": {
                    "installsTotal": 40,
                    "installsByDay": {"2026-10-18": 6},
                    "comments": ["2026-10-18T10:00:00Z"]
                },
                "skill-lint": {
                    "installsTotal": 2,
                    "installsByDay": {"2026-09-01": 2}
                }
            }"#,
        );
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn entities(&self) -> Utf8PathBuf {
        self.root.join("entities.json")
    }

    pub(super) fn counters_json(&self) -> Utf8PathBuf {
        self.root.join("counters.json")
    }

    pub(super) fn counters_db(&self) -> Utf8PathBuf {
        self.root.join("counters.db")
    }
}

/// Counters that put `mcp-git` on top, served from memory in place of disk.
pub(super) fn memory_counters() -> CounterMap {
    let now = scoring_instant();
    CounterMap::from([(
        "mcp-git".to_owned(),
        EngagementCounters::default()
            .with_installs_on(now.date_naive(), 25)
            .with_comment(now),
    )])
}
