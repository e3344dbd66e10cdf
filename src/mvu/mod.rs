// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring both forms, settings, and background commands.

use std::path::PathBuf;

use anyhow::Context;

use crate::logic::download::FolderSink;
use crate::logic::pdf::LopdfCapability;
use crate::logic::reader::FsFileSource;
use crate::logic::workflow::{self, WorkflowContext};
use crate::models::{
    EncryptionScheme, Language, ProtectionRequest, Settings, UnlockFallback, UnlockRequest,
    Workflow,
};
use crate::ui::components::transform_form::{self, FormCommand, FormModel, FormMsg};

/// Top-level application state.
pub struct AppModel {
    pub protect: FormModel,
    pub unlock: FormModel,
    pub settings: Settings,
    /// Latest status message to display.
    pub status: Option<String>,
    pub status_is_error: bool,
    /// Latest error message to display in modal.
    pub error: Option<String>,
    /// Count of queued background commands.
    pub pending_commands: usize,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl AppModel {
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            protect: FormModel::new(Workflow::Protect),
            unlock: FormModel::new(Workflow::Unlock),
            settings,
            status: None,
            status_is_error: false,
            error: None,
            pending_commands: 0,
        }
    }

    fn form_mut(&mut self, workflow: Workflow) -> &mut FormModel {
        match workflow {
            Workflow::Protect => &mut self.protect,
            Workflow::Unlock => &mut self.unlock,
        }
    }
}

/// Application messages routed through the update function.
#[derive(Debug)]
pub enum Msg {
    Protect(FormMsg),
    Unlock(FormMsg),
    SetLanguage(Language),
    SetUnlockFallback(UnlockFallback),
    SetScheme(EncryptionScheme),
    FolderOpened(Result<(), String>),
    DismissError,
}

impl Msg {
    /// Address a form message to the form running `workflow`.
    pub fn form(workflow: Workflow, msg: FormMsg) -> Self {
        match workflow {
            Workflow::Protect => Msg::Protect(msg),
            Workflow::Unlock => Msg::Unlock(msg),
        }
    }
}

/// Commands represent side-effects executed between frames.
#[derive(Debug)]
pub enum Command {
    PickFile(Workflow),
    Protect {
        request: ProtectionRequest,
        settings: Settings,
    },
    Unlock {
        request: UnlockRequest,
        settings: Settings,
    },
    OpenFolder(PathBuf),
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::Protect(m) => update_form(model, Workflow::Protect, m, cmds),
        Msg::Unlock(m) => update_form(model, Workflow::Unlock, m, cmds),
        Msg::SetLanguage(language) => model.settings.language = language,
        Msg::SetUnlockFallback(fallback) => model.settings.unlock_fallback = fallback,
        Msg::SetScheme(scheme) => model.settings.scheme = scheme,
        Msg::FolderOpened(Ok(())) => {}
        Msg::FolderOpened(Err(err)) => surface_event(model, err, true),
        Msg::DismissError => model.error = None,
    }
}

fn update_form(model: &mut AppModel, workflow: Workflow, msg: FormMsg, cmds: &mut Vec<Command>) {
    let lang = model.settings.language;
    let mut form_cmds = Vec::new();
    let event = transform_form::update(model.form_mut(workflow), msg, lang, &mut form_cmds);
    // Form failures are shown inline, so they only reach the status bar, not the modal.
    if let Some(event) = event {
        model.status = Some(event.message);
        model.status_is_error = event.is_error;
    }
    for c in form_cmds {
        match c {
            FormCommand::PickFile => cmds.push(Command::PickFile(workflow)),
            FormCommand::Protect(request) => cmds.push(Command::Protect {
                request,
                settings: model.settings.clone(),
            }),
            FormCommand::Unlock(request) => cmds.push(Command::Unlock {
                request,
                settings: model.settings.clone(),
            }),
            FormCommand::OpenFolder(dir) => cmds.push(Command::OpenFolder(dir)),
        }
    }
}

/// Execute a command on a worker thread and return the resulting message.
pub fn run_command(cmd: Command) -> Msg {
    match cmd {
        Command::PickFile(workflow) => {
            let file = rfd::FileDialog::new()
                .set_title("Select PDF")
                .add_filter("PDF", &["pdf"])
                .pick_file();
            Msg::form(workflow, FormMsg::FilePicked(file))
        }
        Command::Protect { request, settings } => {
            let outcome = with_context(&settings, |ctx| workflow::run(&request, ctx));
            Msg::Protect(FormMsg::Completed(outcome))
        }
        Command::Unlock { request, settings } => {
            let outcome = with_context(&settings, |ctx| workflow::run(&request, ctx));
            Msg::Unlock(FormMsg::Completed(outcome))
        }
        Command::OpenFolder(dir) => {
            let res = open::that(&dir)
                .with_context(|| format!("Failed to open folder {}", dir.display()));
            Msg::FolderOpened(res.map_err(|e| format!("{e:#}")))
        }
    }
}

/// Build the production collaborators for one run.
fn with_context<R>(
    settings: &Settings,
    f: impl FnOnce(&WorkflowContext<'_, LopdfCapability>) -> R,
) -> R {
    let capability = LopdfCapability::new(settings.scheme);
    let sink = FolderSink::new(settings.output_dir.clone());
    let ctx = WorkflowContext {
        files: &FsFileSource,
        capability: &capability,
        sink: &sink,
        language: settings.language,
        unlock_fallback: settings.unlock_fallback,
    };
    f(&ctx)
}

/// Update status/error fields consistently for user feedback.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        model.error = Some(message.clone());
    }
    model.status = Some(message);
    model.status_is_error = is_error;
}
