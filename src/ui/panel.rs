//! Panel layout: status header, module list, feed section, maintenance row.

use chrono::Utc;
use eframe::egui::{self, Color32, RichText};

use crate::action::{ActionKind, ActionRequest};
use crate::app::PanelApp;
use crate::model::{PanelModel, StatusModel, ViewModuleEntry, format_relative};
use crate::notify::Severity;

fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Info => Color32::from_rgb(100, 149, 237),
        Severity::Success => Color32::from_rgb(80, 200, 120),
        Severity::Error => Color32::from_rgb(220, 80, 80),
    }
}

/// Render the whole panel for this frame.
pub fn render_panel(app: &mut PanelApp, ctx: &egui::Context, model: &PanelModel) {
    render_status_bar(app, ctx);

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("PaddiSense");
        ui.separator();

        match model {
            PanelModel::NotFound => {
                ui.add_space(12.0);
                ui.label(
                    "PaddiSense status entity not found. Check that the integration \
                     is installed on the hub.",
                );
            }
            PanelModel::Ready(status) => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    render_status_section(app, ui, status);
                    ui.add_space(12.0);
                    render_modules_section(app, ui, &status.modules);
                    ui.add_space(12.0);
                    render_feed_section(app, ui, status);
                    ui.add_space(12.0);
                    render_maintenance_section(app, ui);
                });
            }
        }
    });

    render_confirm_dialog(app, ctx);
    render_toast(app, ctx);
}

/// A button that disables itself and shows a spinner while its control's
/// service call is in flight.
fn action_button(
    app: &mut PanelApp,
    ui: &mut egui::Ui,
    label: &str,
    enabled: bool,
    request: ActionRequest,
) {
    let loading = app.dispatcher.is_loading(&request.control_key());

    let response = ui.add_enabled(enabled && !loading, egui::Button::new(label));
    if loading {
        ui.spinner();
    }
    if response.clicked() {
        app.submit(request);
    }
}

fn render_status_section(app: &mut PanelApp, ui: &mut egui::Ui, status: &StatusModel) {
    ui.label(RichText::new("Status").strong());

    ui.horizontal(|ui| {
        ui.label("Installed version:");
        ui.label(RichText::new(&status.installed_version).strong());
        if status.update_available {
            ui.label(
                RichText::new("Update available")
                    .color(severity_color(Severity::Success))
                    .small(),
            );
        }
    });

    if let Some(latest) = &status.latest_version {
        ui.horizontal(|ui| {
            ui.label("Latest version:");
            ui.label(latest);
        });
    }

    if let Some(checked) = status.last_checked {
        ui.horizontal(|ui| {
            ui.label("Last checked:");
            ui.label(format_relative(checked, Utc::now()));
        });
    }

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        action_button(
            app,
            ui,
            "Check for updates",
            true,
            ActionRequest::new(ActionKind::CheckUpdates),
        );
        action_button(
            app,
            ui,
            "Update",
            status.update_available,
            ActionRequest::new(ActionKind::Update),
        );
    });
}

fn render_modules_section(app: &mut PanelApp, ui: &mut egui::Ui, modules: &[ViewModuleEntry]) {
    ui.label(RichText::new("Modules").strong());

    if modules.is_empty() {
        ui.label("No modules reported by the hub.");
        return;
    }

    for entry in modules {
        ui.horizontal(|ui| {
            ui.label(entry.record.display_name());

            if let Some(version) = &entry.record.version {
                ui.label(RichText::new(version).weak().small());
            }

            if entry.installed {
                ui.label(
                    RichText::new("Installed")
                        .color(severity_color(Severity::Success))
                        .small(),
                );
            } else if entry.blocked {
                ui.label(
                    RichText::new(format!(
                        "Missing: {}",
                        entry.record.missing_dependencies.join(", ")
                    ))
                    .color(severity_color(Severity::Error))
                    .small(),
                );
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if entry.installed {
                    action_button(
                        app,
                        ui,
                        "Remove",
                        true,
                        ActionRequest::for_module(
                            ActionKind::RemoveModule,
                            entry.record.clone(),
                        ),
                    );
                } else {
                    action_button(
                        app,
                        ui,
                        "Install",
                        !entry.blocked,
                        ActionRequest::for_module(
                            ActionKind::InstallModule,
                            entry.record.clone(),
                        ),
                    );
                }
            });
        });
    }
}

fn render_feed_section(app: &mut PanelApp, ui: &mut egui::Ui, status: &StatusModel) {
    ui.label(RichText::new("RTR Feed").strong());

    ui.horizontal(|ui| {
        ui.label("Status:");
        if status.feed.configured {
            ui.label(RichText::new("Configured").color(severity_color(Severity::Success)));
            ui.label(format!("{} paddocks", status.feed.paddock_count));
        } else {
            ui.label(RichText::new("Not configured").weak());
        }
    });

    if let Some(updated) = status.feed.last_updated {
        ui.horizontal(|ui| {
            ui.label("Last updated:");
            ui.label(format_relative(updated, Utc::now()));
        });
    }

    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut app.feed_url_input)
                .hint_text("https://rtr.example/feed")
                .desired_width(280.0),
        );
        let url = app.feed_url_input.clone();
        action_button(app, ui, "Save", true, ActionRequest::configure_feed(url));
        action_button(
            app,
            ui,
            "Refresh",
            status.feed.configured,
            ActionRequest::new(ActionKind::RefreshFeed),
        );
    });
}

fn render_maintenance_section(app: &mut PanelApp, ui: &mut egui::Ui) {
    ui.label(RichText::new("Maintenance").strong());

    ui.horizontal(|ui| {
        action_button(
            app,
            ui,
            "Create backup",
            true,
            ActionRequest::new(ActionKind::Backup),
        );
        action_button(
            app,
            ui,
            "Restore backup",
            true,
            ActionRequest::new(ActionKind::RestoreBackup),
        );
        action_button(
            app,
            ui,
            "Export registry",
            true,
            ActionRequest::new(ActionKind::Export),
        );
    });
}

/// Modal confirmation dialog for consequential actions.
fn render_confirm_dialog(app: &mut PanelApp, ctx: &egui::Context) {
    let Some(prompt) = app
        .pending_confirm
        .as_ref()
        .and_then(ActionRequest::confirm_prompt)
    else {
        return;
    };

    let mut decision: Option<bool> = None;

    egui::Window::new("Confirm")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(prompt);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Confirm").clicked() {
                    decision = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    decision = Some(false);
                }
            });
        });

    if let Some(accepted) = decision {
        app.resolve_confirm(accepted);
    }
}

/// The single toast, bottom-right.
fn render_toast(app: &PanelApp, ctx: &egui::Context) {
    let Some(notification) = app.notifications.current() else {
        return;
    };

    egui::Window::new("notification")
        .title_bar(false)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .show(ctx, |ui| {
            ui.label(
                RichText::new(&notification.message)
                    .color(severity_color(notification.severity)),
            );
        });
}

/// Footer with refresh state and connection errors.
fn render_status_bar(app: &mut PanelApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if app.is_refreshing() {
                ui.spinner();
                ui.label("Refreshing...");
            } else if let Some(error) = &app.states_error {
                ui.label(
                    RichText::new(format!("Hub unreachable: {}", error))
                        .color(severity_color(Severity::Error)),
                );
            } else {
                ui.label(RichText::new("Connected").weak());
                if let Some(refreshed) = app.last_refresh() {
                    let elapsed = chrono::Duration::from_std(refreshed.elapsed())
                        .unwrap_or_else(|_| chrono::Duration::zero());
                    ui.label(
                        RichText::new(format!(
                            "Last refresh: {}",
                            format_relative(Utc::now() - elapsed, Utc::now())
                        ))
                        .weak()
                        .small(),
                    );
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh now").clicked() {
                    app.refresh_snapshot();
                }
            });
        });
    });
}
