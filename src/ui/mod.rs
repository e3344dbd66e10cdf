// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell with the protect and unlock forms.
//! Handles layout, settings controls, and wiring to background workers.

pub mod components;

use eframe::egui;

use crate::models::{EncryptionScheme, Language, Settings, UnlockFallback, Workflow};
use crate::mvu::{self, AppModel, Command, Msg};
use crate::ui::components::transform_form::{self, FormModel};

/// Stateful egui application for protecting and unlocking PDF files.
pub struct PdfLockApp {
    model: AppModel,
    inbox: Vec<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
}

impl PdfLockApp {
    /// Spawn the worker pool and start with `settings`.
    pub fn new(settings: Settings) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();

        let threads = std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2);
        log::debug!("starting {threads} worker threads");
        for _ in 0..threads {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            std::thread::spawn(move || {
                for cmd in cmd_rx.iter() {
                    let msg = mvu::run_command(cmd);
                    let _ = msg_tx.send(msg);
                }
            });
        }

        Self {
            model: AppModel::with_settings(settings),
            inbox: Vec::new(),
            cmd_tx,
            msg_rx,
        }
    }
}

impl Default for PdfLockApp {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl eframe::App for PdfLockApp {
    /// Required by eframe 0.34; all rendering happens in `update`, which eframe still calls first.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    /// Drain worker results, apply queued messages, then render the top bar, status bar and
    /// both forms. Views push their messages into the inbox for the next frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_spacing(ctx);

        // Pull messages produced by the command workers.
        let mut received = false;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push(msg);
            received = true;
        }

        let msgs = std::mem::take(&mut self.inbox);
        for msg in msgs {
            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            for cmd in commands {
                if self.cmd_tx.send(cmd).is_ok() {
                    self.model.pending_commands += 1;
                }
            }
        }
        if received || self.model.pending_commands > 0 {
            // Keep polling while workers are busy; they cannot wake the UI themselves.
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        let lang = self.model.settings.language;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading(format!("{} PDFLock", egui_phosphor::regular::LOCK_KEY));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_theme_controls(ui);
                    ui.separator();
                    self.render_language_toggle(ui);
                    ui.separator();
                    self.render_security_menu(ui, lang);
                });
            });
            ui.add_space(4.0);
        });

        self.render_error_modal(ctx, lang);

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_form_section(ui, Workflow::Protect, lang);
                ui.add_space(12.0);
                self.render_form_section(ui, Workflow::Unlock, lang);
                ui.add_space(8.0);
            });
        });
    }
}

impl PdfLockApp {
    fn ensure_spacing(&self, ctx: &egui::Context) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(6.0, 6.0);
        });
    }

    fn render_theme_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(2.0);
        egui::widgets::global_theme_preference_switch(ui);
    }

    /// Segmented EN/JA switch; the choice applies to messages produced after it.
    fn render_language_toggle(&mut self, ui: &mut egui::Ui) {
        let mut choice = self.model.settings.language;
        ui.selectable_value(&mut choice, Language::Japanese, "日本語");
        ui.selectable_value(&mut choice, Language::English, "EN");
        if choice != self.model.settings.language {
            self.inbox.push(Msg::SetLanguage(choice));
        }
    }

    /// Encryption scheme and unlock fallback posture.
    fn render_security_menu(&mut self, ui: &mut egui::Ui, lang: Language) {
        let settings = &self.model.settings;
        let mut scheme = settings.scheme;
        let mut fallback = settings.unlock_fallback;

        ui.menu_button(
            format!(
                "{} {}",
                egui_phosphor::regular::SHIELD_CHECK,
                lang.pick("Security", "セキュリティ")
            ),
            |ui| {
                ui.label(lang.pick("Encryption for new passwords", "付与する暗号方式"));
                for option in [EncryptionScheme::Rc4_128, EncryptionScheme::Aes128] {
                    ui.radio_value(&mut scheme, option, option.label());
                }
                ui.separator();
                render_fallback_checkbox(ui, &mut fallback, lang);
            },
        );

        if scheme != self.model.settings.scheme {
            self.inbox.push(Msg::SetScheme(scheme));
        }
        if fallback != self.model.settings.unlock_fallback {
            self.inbox.push(Msg::SetUnlockFallback(fallback));
        }
    }

    fn render_form_section(&mut self, ui: &mut egui::Ui, workflow: Workflow, lang: Language) {
        let (title, form): (&str, &FormModel) = match workflow {
            Workflow::Protect => (lang.pick("Add a password", "パスワードを付与"), &self.model.protect),
            Workflow::Unlock => (lang.pick("Remove a password", "パスワードを解除"), &self.model.unlock),
        };
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading(title);
            ui.add_space(6.0);
            let msgs = transform_form::view(ui, form, lang);
            self.inbox
                .extend(msgs.into_iter().map(|m| Msg::form(form.workflow(), m)));
        });
    }

    /// Render a simple modal window for error messages.
    fn render_error_modal(&mut self, ctx: &egui::Context, lang: Language) {
        if let Some(message) = self.model.error.clone() {
            egui::Window::new(lang.pick("Error", "エラー"))
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissError);
                    }
                });
        }
    }

    /// Render latest status message and the background task spinner.
    fn render_status(&self, ui: &mut egui::Ui) {
        let pending = self.model.pending_commands;
        ui.horizontal(|ui| {
            if let Some(text) = &self.model.status {
                let color = if self.model.status_is_error {
                    egui::Color32::from_rgb(200, 40, 40)
                } else {
                    egui::Color32::from_gray(68)
                };
                ui.label(egui::RichText::new(text).color(color));
            }
            if pending > 0 {
                ui.add(egui::Spinner::new().size(14.0))
                    .on_hover_text(format!("{pending} task(s) running in background"));
            }
        });
    }
}

/// Checkbox bound to the unlock fallback setting.
fn render_fallback_checkbox(ui: &mut egui::Ui, fallback: &mut UnlockFallback, lang: Language) {
    let mut lenient = *fallback == UnlockFallback::IgnoreEncryption;
    ui.checkbox(
        &mut lenient,
        lang.pick(
            "Unlock: keep readable content when decryption fails",
            "解除: 復号できない場合も読み取れる内容を残す",
        ),
    )
    .on_hover_text(lang.pick(
        "The password is not verified on this path.",
        "この場合パスワードは検証されません。",
    ));
    *fallback = if lenient {
        UnlockFallback::IgnoreEncryption
    } else {
        UnlockFallback::Strict
    };
}
