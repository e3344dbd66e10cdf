// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Protect/unlock form in an MVU shape: one file, one or two password fields, a message area.

use std::path::{Path, PathBuf};

use eframe::egui;

use crate::logic::messages;
use crate::models::{Language, Outcome, ProtectionRequest, UnlockRequest, Workflow};

/// Text shown below the submit button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMessage {
    Error(String),
    Success { text: String, path: PathBuf },
}

/// UI model for one form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormModel {
    workflow: Workflow,
    file: Option<PathBuf>,
    password: String,
    confirmation: String,
    busy: bool,
    message: Option<FormMessage>,
}

/// Messages emitted by the form view or routed back from workers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMsg {
    RequestPickFile,
    FilePicked(Option<PathBuf>),
    PasswordChanged(String),
    ConfirmationChanged(String),
    Submit,
    Completed(Outcome),
    OpenFolder,
}

/// Side effects requested by the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormCommand {
    PickFile,
    Protect(ProtectionRequest),
    Unlock(UnlockRequest),
    OpenFolder(PathBuf),
}

/// Feedback for the status bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormEvent {
    pub message: String,
    pub is_error: bool,
}

impl FormModel {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            file: None,
            password: String::new(),
            confirmation: String::new(),
            busy: false,
            message: None,
        }
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    fn reset_fields(&mut self) {
        self.file = None;
        self.password.clear();
        self.confirmation.clear();
    }

    /// Validate the current input into a workflow command.
    fn request(&self) -> Result<FormCommand, crate::models::ValidationError> {
        let file = self.file.as_deref();
        match self.workflow {
            Workflow::Protect => {
                ProtectionRequest::from_input(file, &self.password, &self.confirmation)
                    .map(FormCommand::Protect)
            }
            Workflow::Unlock => {
                UnlockRequest::from_input(file, &self.password).map(FormCommand::Unlock)
            }
        }
    }
}

/// Apply a message to the form. Returns a status event when relevant.
pub fn update(
    model: &mut FormModel,
    msg: FormMsg,
    lang: Language,
    cmds: &mut Vec<FormCommand>,
) -> Option<FormEvent> {
    match msg {
        FormMsg::RequestPickFile => {
            cmds.push(FormCommand::PickFile);
            None
        }
        FormMsg::FilePicked(path) => {
            if path.is_some() {
                model.file = path;
            }
            None
        }
        FormMsg::PasswordChanged(text) => {
            model.password = text;
            None
        }
        FormMsg::ConfirmationChanged(text) => {
            model.confirmation = text;
            None
        }
        FormMsg::Submit => {
            if model.busy {
                return None;
            }
            model.message = None;
            match model.request() {
                Ok(cmd) => {
                    model.busy = true;
                    cmds.push(cmd);
                    None
                }
                Err(err) => {
                    let text = messages::validation(lang, model.workflow, err).to_string();
                    model.message = Some(FormMessage::Error(text.clone()));
                    Some(FormEvent {
                        message: text,
                        is_error: true,
                    })
                }
            }
        }
        FormMsg::Completed(outcome) => {
            model.busy = false;
            match outcome {
                Ok(delivered) => {
                    model.reset_fields();
                    model.message = Some(FormMessage::Success {
                        text: delivered.user_message.clone(),
                        path: delivered.path,
                    });
                    Some(FormEvent {
                        message: delivered.user_message,
                        is_error: false,
                    })
                }
                Err(failure) => {
                    model.message = Some(FormMessage::Error(failure.user_message.clone()));
                    Some(FormEvent {
                        message: failure.user_message,
                        is_error: true,
                    })
                }
            }
        }
        FormMsg::OpenFolder => {
            if let Some(FormMessage::Success { path, .. }) = &model.message {
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                cmds.push(FormCommand::OpenFolder(dir));
            }
            None
        }
    }
}

/// Render the form and return any messages triggered by user interaction.
pub fn view(ui: &mut egui::Ui, model: &FormModel, lang: Language) -> Vec<FormMsg> {
    let mut msgs = Vec::new();

    egui::Grid::new(("form_grid", model.workflow))
        .num_columns(2)
        .spacing(egui::vec2(8.0, 10.0))
        .min_col_width(140.0)
        .show(ui, |ui| {
            ui.label(lang.pick("PDF file", "PDF ファイル"));
            ui.horizontal(|ui| {
                let choose = egui::Button::new(format!(
                    "{} {}",
                    egui_phosphor::regular::FILE_PDF,
                    lang.pick("Choose…", "選択…")
                ));
                if ui.add_enabled(!model.is_busy(), choose).clicked() {
                    msgs.push(FormMsg::RequestPickFile);
                }
                match model.file().and_then(Path::file_name) {
                    Some(name) => {
                        ui.label(name.to_string_lossy().into_owned());
                    }
                    None => {
                        ui.label(
                            egui::RichText::new(lang.pick("No file selected", "未選択"))
                                .color(egui::Color32::from_gray(150)),
                        );
                    }
                }
            });
            ui.end_row();

            let password_label = match model.workflow {
                Workflow::Protect => lang.pick("Password", "パスワード"),
                Workflow::Unlock => lang.pick("Current password", "現在のパスワード"),
            };
            ui.label(password_label);
            let mut password = model.password.clone();
            if ui
                .add(egui::TextEdit::singleline(&mut password).password(true))
                .changed()
            {
                msgs.push(FormMsg::PasswordChanged(password));
            }
            ui.end_row();

            if model.workflow == Workflow::Protect {
                ui.label(lang.pick("Confirm password", "パスワード（確認）"));
                let mut confirmation = model.confirmation.clone();
                if ui
                    .add(egui::TextEdit::singleline(&mut confirmation).password(true))
                    .changed()
                {
                    msgs.push(FormMsg::ConfirmationChanged(confirmation));
                }
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    let label = if model.is_busy() {
        messages::processing(lang).to_string()
    } else {
        match model.workflow {
            Workflow::Protect => format!(
                "{} {}",
                egui_phosphor::regular::LOCK_SIMPLE,
                lang.pick("Add password", "パスワードを付与")
            ),
            Workflow::Unlock => format!(
                "{} {}",
                egui_phosphor::regular::LOCK_SIMPLE_OPEN,
                lang.pick("Remove password", "パスワードを解除")
            ),
        }
    };
    if ui.add_enabled(!model.is_busy(), egui::Button::new(label)).clicked() {
        msgs.push(FormMsg::Submit);
    }

    match model.message() {
        Some(FormMessage::Error(text)) => {
            ui.add_space(6.0);
            ui.label(egui::RichText::new(text).color(egui::Color32::from_rgb(200, 40, 40)));
        }
        Some(FormMessage::Success { text, .. }) => {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(text).color(egui::Color32::from_rgb(30, 140, 60)));
                if ui
                    .button(format!(
                        "{} {}",
                        egui_phosphor::regular::FOLDER_OPEN,
                        lang.pick("Open folder", "フォルダーを開く")
                    ))
                    .clicked()
                {
                    msgs.push(FormMsg::OpenFolder);
                }
            });
        }
        None => {}
    }

    msgs
}
