//! Render-model derivation.
//!
//! Pure functions from the raw snapshot to what the panel draws: version and
//! feed summaries, the merged module list, and relative timestamps. Nothing
//! here touches the network or mutates app state, so all of it is covered by
//! plain unit tests.

use chrono::{DateTime, Utc};

use crate::snapshot::{EntityState, ModuleRecord, StatusSnapshot};

/// What the panel renders: either the derived status, or a placeholder when
/// the hub has no status entity at all.
#[derive(Debug, Clone)]
pub enum PanelModel {
    /// Status entity missing from the state map
    NotFound,
    Ready(StatusModel),
}

#[derive(Debug, Clone)]
pub struct StatusModel {
    pub installed_version: String,
    pub latest_version: Option<String>,
    pub update_available: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub modules: Vec<ViewModuleEntry>,
    pub feed: FeedModel,
}

#[derive(Debug, Clone, Default)]
pub struct FeedModel {
    pub configured: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub paddock_count: u64,
}

/// A module row: the record plus its presentation flags.
/// Invariant: `blocked` is never true for an installed entry.
#[derive(Debug, Clone)]
pub struct ViewModuleEntry {
    pub record: ModuleRecord,
    pub installed: bool,
    pub blocked: bool,
}

impl PanelModel {
    /// Derive the render model from the current state map entries.
    pub fn build(status: Option<&EntityState>, feed: Option<&EntityState>) -> Self {
        let Some(status) = status else {
            return PanelModel::NotFound;
        };

        let snapshot = StatusSnapshot::from_entities(status, feed);

        // Version display falls back to the raw state token, then "unknown".
        let installed_version = snapshot
            .installed_version
            .clone()
            .or_else(|| {
                let state = snapshot.raw_state.trim();
                (!state.is_empty()).then(|| state.to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        PanelModel::Ready(StatusModel {
            installed_version,
            latest_version: snapshot.latest_version.clone(),
            update_available: snapshot.update_available,
            last_checked: snapshot.last_checked,
            modules: merge_modules(&snapshot.installed_modules, &snapshot.available_modules),
            feed: FeedModel {
                configured: snapshot.feed_configured,
                last_updated: snapshot.feed_last_updated,
                paddock_count: snapshot.feed_unit_count,
            },
        })
    }
}

/// Combine the installed and available module lists into one display list:
/// installed entries first, then available ones, each list keeping its input
/// order. An available module with unmet dependencies is marked blocked.
///
/// No de-duplication: the hub never reports an id in both lists, and if it
/// ever did, showing the id twice is more honest than guessing which side
/// to drop.
pub fn merge_modules(
    installed: &[ModuleRecord],
    available: &[ModuleRecord],
) -> Vec<ViewModuleEntry> {
    let mut entries = Vec::with_capacity(installed.len() + available.len());

    for record in installed {
        entries.push(ViewModuleEntry {
            record: record.clone(),
            installed: true,
            blocked: false,
        });
    }

    for record in available {
        let blocked = !record.missing_dependencies.is_empty();
        entries.push(ViewModuleEntry {
            record: record.clone(),
            installed: false,
            blocked,
        });
    }

    entries
}

/// Format an instant relative to `now` for timestamp rows.
///
/// Buckets: under a minute, minutes, hours, then a plain date once the value
/// is a day or more old. The hour bucket deliberately reads "1 hours ago" at
/// 60-119 minutes, matching what the hub frontend has always shown.
pub fn format_relative(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(instant);

    if elapsed.num_seconds() < 60 {
        return "Just now".to_string();
    }

    let minutes = elapsed.num_minutes();
    if minutes < 60 {
        return format!("{} minutes ago", minutes);
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{} hours ago", hours);
    }

    instant.format("%x").to_string()
}
