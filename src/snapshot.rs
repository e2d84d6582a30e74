//! Parsing of the hub's keyed state map into a status snapshot.
//!
//! The panel reads two entities from the hub each refresh: the primary status
//! entity (version, module registry) and the RTR feed entity. Both are plain
//! state-map entries whose interesting data lives in free-form attributes, so
//! every attribute is optional and falls back to a stated default. A snapshot
//! is rebuilt from the raw entities on every render and never cached.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Entity id of the primary status sensor exposed by the hub integration.
pub const STATUS_ENTITY: &str = "sensor.paddisense_status";

/// Entity id of the RTR feed status sensor.
pub const FEED_ENTITY: &str = "sensor.paddisense_rtr";

/// One entry of the hub's read-only state map.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
}

/// An add-on module as reported by the hub's module registry.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModuleRecord {
    /// Stable identifier, e.g. "ipm"
    pub id: String,
    /// Display label; falls back to the id when absent
    pub name: Option<String>,
    pub version: Option<String>,
    /// Module ids that must be installed before this one
    pub dependencies: Vec<String>,
    /// Module ids that currently require this one
    pub dependents: Vec<String>,
    /// Dependencies that are not yet installed
    pub missing_dependencies: Vec<String>,
}

impl ModuleRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Everything the panel knows about the installation, read once per render.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    /// `installed_version` attribute, when the integration reported one
    pub installed_version: Option<String>,
    /// The entity's raw state token, used as a version fallback
    pub raw_state: String,
    pub latest_version: Option<String>,
    pub update_available: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub installed_modules: Vec<ModuleRecord>,
    pub available_modules: Vec<ModuleRecord>,
    pub feed_configured: bool,
    pub feed_last_updated: Option<DateTime<Utc>>,
    pub feed_unit_count: u64,
}

impl StatusSnapshot {
    /// Build a snapshot from the status entity and, when present, the feed
    /// entity. A missing feed entity just leaves the feed unconfigured.
    pub fn from_entities(status: &EntityState, feed: Option<&EntityState>) -> Self {
        let attrs = &status.attributes;

        let mut snapshot = Self {
            installed_version: attr_string(attrs, "installed_version"),
            raw_state: status.state.clone(),
            latest_version: attr_string(attrs, "latest_version"),
            update_available: attr_bool(attrs, "update_available"),
            last_checked: attr_instant(attrs, "last_checked"),
            installed_modules: attr_modules(attrs, "installed_modules"),
            available_modules: attr_modules(attrs, "available_modules"),
            ..Self::default()
        };

        if let Some(feed) = feed {
            let attrs = &feed.attributes;
            snapshot.feed_configured = attr_bool(attrs, "rtr_url_set");
            snapshot.feed_last_updated = attr_instant(attrs, "rtr_last_updated");
            snapshot.feed_unit_count = attr_u64(attrs, "rtr_paddock_count");
        }

        snapshot
    }
}

fn attr_string(attrs: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    attrs
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn attr_bool(attrs: &serde_json::Map<String, Value>, key: &str) -> bool {
    attrs.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn attr_u64(attrs: &serde_json::Map<String, Value>, key: &str) -> u64 {
    attrs.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn attr_instant(attrs: &serde_json::Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    attrs
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn attr_modules(attrs: &serde_json::Map<String, Value>, key: &str) -> Vec<ModuleRecord> {
    let Some(value) = attrs.get(key) else {
        return Vec::new();
    };

    match serde_json::from_value(value.clone()) {
        Ok(modules) => modules,
        Err(e) => {
            tracing::warn!("Malformed '{}' attribute ignored: {}", key, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(state: &str, attributes: Value) -> EntityState {
        EntityState {
            entity_id: STATUS_ENTITY.to_string(),
            state: state.to_string(),
            attributes: attributes.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_snapshot_defaults_for_bare_entity() {
        let status = entity("1.4.2", json!({}));
        let snapshot = StatusSnapshot::from_entities(&status, None);

        assert_eq!(snapshot.installed_version, None);
        assert_eq!(snapshot.raw_state, "1.4.2");
        assert_eq!(snapshot.latest_version, None);
        assert!(!snapshot.update_available);
        assert_eq!(snapshot.last_checked, None);
        assert!(snapshot.installed_modules.is_empty());
        assert!(snapshot.available_modules.is_empty());
        assert!(!snapshot.feed_configured);
        assert_eq!(snapshot.feed_unit_count, 0);
    }

    #[test]
    fn test_snapshot_parses_full_attributes() {
        let status = entity(
            "ok",
            json!({
                "installed_version": "1.4.2",
                "latest_version": "1.5.0",
                "update_available": true,
                "last_checked": "2026-08-20T10:00:00+00:00",
                "installed_modules": [
                    {"id": "ipm", "name": "Integrated Pest Management", "version": "0.9"}
                ],
                "available_modules": [
                    {"id": "pwm", "dependencies": ["ipm"], "missing_dependencies": []}
                ],
            }),
        );
        let feed = entity(
            "connected",
            json!({
                "rtr_url_set": true,
                "rtr_last_updated": "2026-08-21T08:30:00+00:00",
                "rtr_paddock_count": 14,
            }),
        );

        let snapshot = StatusSnapshot::from_entities(&status, Some(&feed));

        assert_eq!(snapshot.installed_version.as_deref(), Some("1.4.2"));
        assert_eq!(snapshot.latest_version.as_deref(), Some("1.5.0"));
        assert!(snapshot.update_available);
        assert!(snapshot.last_checked.is_some());
        assert_eq!(snapshot.installed_modules.len(), 1);
        assert_eq!(
            snapshot.installed_modules[0].display_name(),
            "Integrated Pest Management"
        );
        assert_eq!(snapshot.available_modules[0].display_name(), "pwm");
        assert!(snapshot.feed_configured);
        assert_eq!(snapshot.feed_unit_count, 14);
    }

    #[test]
    fn test_malformed_module_list_is_ignored() {
        let status = entity("ok", json!({ "installed_modules": "not a list" }));
        let snapshot = StatusSnapshot::from_entities(&status, None);
        assert!(snapshot.installed_modules.is_empty());
    }

    #[test]
    fn test_bad_timestamp_is_ignored() {
        let status = entity("ok", json!({ "last_checked": "yesterday-ish" }));
        let snapshot = StatusSnapshot::from_entities(&status, None);
        assert_eq!(snapshot.last_checked, None);
    }
}
