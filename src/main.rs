mod controller;
mod engine;
mod model;
mod store;
mod timer;
mod updater;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;
use log::{info, warn};

use controller::{AmbienceController, ControlSurface};
use engine::{AmbienceOutput, EnvironmentAmbience};
use model::NetworkConfig;
use store::SettingsStore;
use timer::AUTO_HIDE_DELAY;
use updater::UpdatePoll;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([380.0, 170.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ambient Light Adjustment",
        options,
        Box::new(|_cc| Box::new(AmbientLightApp::default())),
    )
}

/// The visible slider state. The controller pushes programmatic level
/// changes in here through the `ControlSurface` seam.
#[derive(Default)]
struct AdjustmentPanel {
    displayed_level: f32,
}

impl ControlSurface for AdjustmentPanel {
    fn set_displayed_level(&mut self, level: f32) {
        self.displayed_level = level;
    }
}

struct AmbientLightApp {
    controller: AmbienceController,
    panel: AdjustmentPanel,
    store: SettingsStore,
    output: Option<AmbienceOutput>,
    environment: EnvironmentAmbience,
    update_poll: UpdatePoll,
    status: String,
}

impl Default for AmbientLightApp {
    fn default() -> Self {
        let store = SettingsStore::new(user_settings_path());
        let stored = store.load_or_default();

        let environment = EnvironmentAmbience::new();
        let controller =
            AmbienceController::new(environment.sample(Instant::now()), stored, AUTO_HIDE_DELAY);

        let panel = AdjustmentPanel {
            displayed_level: controller.active_setting().level(),
        };

        let mut update_poll = UpdatePoll::new();
        update_poll.start();

        info!("[APP] Ambient Light Adjustment v{} starting", updater::VERSION);

        Self {
            controller,
            panel,
            store,
            output: AmbienceOutput::new(NetworkConfig::default()),
            environment,
            update_poll,
            status: "Ready".to_owned(),
        }
    }
}

impl AmbientLightApp {
    fn save_settings(&mut self) {
        match self
            .store
            .save(self.controller.active_setting(), self.controller.inactive_setting())
        {
            Ok(_) => {
                self.status = "Saved".into();
            }
            Err(e) => {
                // In-memory state stays authoritative for the session.
                self.status = format!("Save failed: {}", e);
                warn!("[APP] settings save failed: {:#}", e);
            }
        }
    }

    fn toggle_panel(&mut self, now: Instant) {
        if self.controller.is_visible() {
            self.controller.hide();
        } else {
            self.controller.show(&mut self.panel, now);
        }
    }
}

impl eframe::App for AmbientLightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.update_poll.poll();

        if self.controller.poll_auto_hide(now) {
            self.status = "Ready".into();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let response = ui.button("☀ Ambient Light").on_hover_text(
                    "Ambient Light Adjustment\n\
                     Click: show/hide slider\n\
                     Right-click: reset to default\n\
                     Middle-click: switch setting",
                );

                if response.clicked() {
                    self.toggle_panel(now);
                }
                if response.secondary_clicked() {
                    self.controller.reset_to_default(&mut self.panel, now);
                    self.save_settings();
                }
                if response.middle_clicked() {
                    self.controller.swap_slots(&mut self.panel);
                    self.save_settings();
                }

                ui.separator();
                ui.label(&self.status);

                if self.update_poll.update_available() {
                    ui.separator();
                    ui.label(
                        egui::RichText::new("Update available")
                            .color(egui::Color32::LIGHT_YELLOW),
                    );
                }
            });
        });

        if self.controller.is_visible() {
            let mut edited = false;
            egui::Window::new("Ambient Light")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    let response = ui.add(
                        egui::Slider::new(&mut self.panel.displayed_level, 0.0..=1.0)
                            .text("Level"),
                    );
                    if response.changed() {
                        edited = self.controller.edit(self.panel.displayed_level, now);
                    }

                    let active = self.controller.active_setting();
                    if active.use_default_ambience() {
                        ui.label("Following scene default");
                    } else {
                        ui.label(format!("Manual override: {:.2}", active.level()));
                    }
                });
            if edited {
                self.save_settings();
            }
        }

        // Per-frame tick: sample the live default, derive the effective
        // ambience, republish.
        let environment_default = self.environment.sample(now);
        let output_color = self.controller.tick(environment_default);
        if let Some(output) = &mut self.output {
            output.publish(output_color);
        }

        // Keep ticking so the auto-hide deadline and drifting default are
        // observed without user input.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

fn user_settings_path() -> PathBuf {
    // Cross-platform-ish config path
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("AmbientLightAdjustment")
                .join("settings.json");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(base) = std::env::var_os("APPDATA") {
            return PathBuf::from(base)
                .join("AmbientLightAdjustment")
                .join("settings.json");
        }
    }

    // Linux / fallback: XDG or ~/.config
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(base)
            .join("ambientlight")
            .join("settings.json")
    } else if let Some(home) = home::home_dir() {
        home.join(".config").join("ambientlight").join("settings.json")
    } else {
        // Last resort: current directory
        PathBuf::from("settings.json")
    }
}
