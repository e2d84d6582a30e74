//! The panel's action catalogue.
//!
//! Every button maps to one `ActionKind`. The kind knows its hub service id,
//! whether it needs the user to confirm first, and the enum is exhaustive so
//! adding an action without wiring its routing fails to compile. The request
//! carries whatever context the action needs (the target module, the entered
//! feed URL) and builds the service payload and all user-facing copy from it.

use serde_json::{Value, json};

use crate::snapshot::ModuleRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CheckUpdates,
    Update,
    InstallModule,
    RemoveModule,
    Backup,
    RestoreBackup,
    Export,
    ConfigureFeed,
    RefreshFeed,
}

impl ActionKind {
    /// Hub service id, or `None` for actions handled entirely panel-side.
    pub fn service(self) -> Option<&'static str> {
        match self {
            ActionKind::CheckUpdates => Some("check_for_updates"),
            ActionKind::Update => Some("update_paddisense"),
            ActionKind::InstallModule => Some("install_module"),
            ActionKind::RemoveModule => Some("remove_module"),
            ActionKind::Backup => Some("create_backup"),
            ActionKind::RestoreBackup => None,
            ActionKind::Export => Some("export_registry"),
            ActionKind::ConfigureFeed => Some("set_feed_url"),
            ActionKind::RefreshFeed => Some("refresh_feed_data"),
        }
    }

    /// Whether the action blocks on a confirmation dialog before invoking.
    pub fn requires_confirmation(self) -> bool {
        matches!(
            self,
            ActionKind::Update | ActionKind::InstallModule | ActionKind::RemoveModule
        )
    }
}

/// One user gesture, from click to reported outcome.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub kind: ActionKind,
    /// Target module for install/remove
    pub module: Option<ModuleRecord>,
    /// URL entered by the user, for feed configuration
    pub feed_url: Option<String>,
}

impl ActionRequest {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            module: None,
            feed_url: None,
        }
    }

    pub fn for_module(kind: ActionKind, module: ModuleRecord) -> Self {
        Self {
            kind,
            module: Some(module),
            feed_url: None,
        }
    }

    pub fn configure_feed(url: String) -> Self {
        Self {
            kind: ActionKind::ConfigureFeed,
            module: None,
            feed_url: Some(url),
        }
    }

    fn module_name(&self) -> &str {
        self.module.as_ref().map_or("module", |m| m.display_name())
    }

    /// Stable key identifying the originating control, used for the
    /// per-control loading flag. Module actions get one key per module so
    /// two different rows can be in flight at once.
    pub fn control_key(&self) -> String {
        let tag = match self.kind {
            ActionKind::CheckUpdates => "check-updates",
            ActionKind::Update => "update",
            ActionKind::InstallModule => "install",
            ActionKind::RemoveModule => "remove",
            ActionKind::Backup => "backup",
            ActionKind::RestoreBackup => "restore",
            ActionKind::Export => "export",
            ActionKind::ConfigureFeed => "configure-feed",
            ActionKind::RefreshFeed => "refresh-feed",
        };

        match &self.module {
            Some(module) => format!("{}:{}", tag, module.id),
            None => tag.to_string(),
        }
    }

    /// Payload for the hub service call.
    pub fn payload(&self) -> Value {
        match self.kind {
            ActionKind::Update => json!({ "backupFirst": true }),
            ActionKind::InstallModule => {
                let id = self.module.as_ref().map(|m| m.id.as_str()).unwrap_or("");
                json!({ "moduleId": id })
            }
            ActionKind::RemoveModule => {
                let Some(module) = &self.module else {
                    return json!({ "moduleId": "" });
                };
                if module.dependents.is_empty() {
                    json!({ "moduleId": module.id })
                } else {
                    // Dependents exist; the user confirmed anyway, so tell
                    // the hub to remove regardless.
                    json!({ "moduleId": module.id, "force": true })
                }
            }
            ActionKind::ConfigureFeed => {
                json!({ "url": self.feed_url.as_deref().unwrap_or("") })
            }
            _ => json!({}),
        }
    }

    /// Confirmation prompt for consequential actions, `None` for the rest.
    pub fn confirm_prompt(&self) -> Option<String> {
        match self.kind {
            ActionKind::InstallModule => {
                let name = self.module_name();
                let mut prompt = format!("Install module '{}'?", name);
                if let Some(module) = &self.module {
                    if !module.dependencies.is_empty() {
                        prompt.push_str(&format!(
                            "\n\nRequires: {}",
                            module.dependencies.join(", ")
                        ));
                    }
                }
                prompt.push_str("\n\nThe hub will restart to activate the module.");
                Some(prompt)
            }
            ActionKind::RemoveModule => {
                let name = self.module_name();
                let mut prompt = String::new();
                if let Some(module) = &self.module {
                    if !module.dependents.is_empty() {
                        prompt.push_str(&format!(
                            "Warning: the following modules depend on '{}': {}.\n\n",
                            name,
                            module.dependents.join(", ")
                        ));
                    }
                }
                prompt.push_str(&format!(
                    "Remove module '{}'?\n\nModule data is preserved on disk. The hub will restart.",
                    name
                ));
                Some(prompt)
            }
            ActionKind::Update => Some(
                "Update PaddiSense?\n\nA backup is created before the update and the hub \
                 restarts afterwards."
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Info toast shown when the invocation starts.
    pub fn pending_message(&self) -> String {
        match self.kind {
            ActionKind::CheckUpdates => "Checking for updates...".to_string(),
            ActionKind::Update => "Updating PaddiSense...".to_string(),
            ActionKind::InstallModule => format!("Installing {}...", self.module_name()),
            ActionKind::RemoveModule => format!("Removing {}...", self.module_name()),
            ActionKind::Backup => "Creating backup...".to_string(),
            ActionKind::RestoreBackup => "Opening the hub's backup manager...".to_string(),
            ActionKind::Export => "Exporting module registry...".to_string(),
            ActionKind::ConfigureFeed => "Saving feed URL...".to_string(),
            ActionKind::RefreshFeed => "Refreshing feed data...".to_string(),
        }
    }

    /// Success toast shown when the hub accepted the call.
    pub fn success_message(&self) -> String {
        match self.kind {
            ActionKind::CheckUpdates => "Update check complete.".to_string(),
            ActionKind::Update => {
                "Update started. The hub will restart when it finishes.".to_string()
            }
            ActionKind::InstallModule => format!(
                "Module '{}' installed. The hub is restarting to activate it.",
                self.module_name()
            ),
            ActionKind::RemoveModule => {
                format!("Module '{}' removed. The hub is restarting.", self.module_name())
            }
            ActionKind::Backup => "Backup created.".to_string(),
            ActionKind::RestoreBackup => "Backup manager opened.".to_string(),
            ActionKind::Export => "Module registry exported.".to_string(),
            ActionKind::ConfigureFeed => "Feed URL saved.".to_string(),
            ActionKind::RefreshFeed => "Feed refresh requested.".to_string(),
        }
    }
}
