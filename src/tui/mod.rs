// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! The interactive shell (ratatui + crossterm): source editor, live text
//! preview with visual editing, file tree, publish tabs, notifications, and
//! the decorative console overlay.

use std::error::Error;
use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;

use crate::dom::{parse_document, path_of, Attribute, DomTree, NodeIndex};
use crate::edit::{commit_edit, EditError, MatchStrategy};
use crate::ingest;
use crate::model::{DocumentId, EditSession, Workspace};
use crate::preview::{
    is_editable_tag, render_preview, truncate_with_ellipsis, PreviewRender, PreviewSurface,
    RenderOptions,
};
use crate::publish::{
    DeployMethod, DeployRecord, FileSet, GithubClient, GithubConnection, NetlifyClient,
    NetlifyConnection, TargetKind,
};
use crate::store::{AutoDeployFlags, ConfigFolder, LayoutState};
use crate::term::{complete, Completion, Console, ConsoleOutcome};

mod editor;
mod theme;

use editor::EditorBuffer;
use theme::TuiTheme;

const FOOTER_BRAND: &str = "🅷 🅰 🅻 🅸 🅼 🅴 🅳 🅴 ";
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);
const SIDEBAR_WIDTH: u16 = 30;
const MIN_EDITOR_PERCENT: u16 = 20;
const MAX_EDITOR_PERCENT: u16 = 80;

/// Runs the interactive terminal UI until the user quits.
pub fn run_with_workspace(
    workspace: Workspace,
    config: ConfigFolder,
    runtime: Option<tokio::runtime::Handle>,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(workspace, config, runtime);

    while !app.should_quit {
        app.tick();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> Result<(), Box<dyn Error>> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaneFocus {
    Sidebar,
    Editor,
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SidebarTab {
    Files,
    Github,
    Netlify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug)]
struct Notification {
    message: String,
    level: NotifyLevel,
    created: Instant,
}

#[derive(Debug, Default)]
struct PreviewState {
    render: Option<PreviewRender>,
    tree: Option<DomTree>,
    /// (document, revision) the current render derives from.
    rendered: Option<(DocumentId, u64)>,
    scroll: usize,
    visual_mode: bool,
    selected: Option<NodeIndex>,
}

#[derive(Debug, Clone)]
enum PromptPurpose {
    EditElement { attrs: Vec<Attribute> },
    OpenPath,
    Connect { target: TargetKind, step: usize, draft: Vec<String> },
}

#[derive(Debug, Clone)]
struct InputPrompt {
    title: String,
    value: String,
    cursor: usize,
    purpose: PromptPurpose,
}

impl InputPrompt {
    fn new(title: impl Into<String>, value: impl Into<String>, purpose: PromptPurpose) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self {
            title: title.into(),
            value,
            cursor,
            purpose,
        }
    }
}

/// Events the background connect/deploy tasks stream back to the UI thread.
#[derive(Debug)]
enum WorkerEvent {
    Status {
        target: TargetKind,
        message: String,
    },
    GithubConnected(GithubConnection),
    NetlifyConnected(NetlifyConnection, String),
    ConnectFailed {
        target: TargetKind,
        message: String,
    },
    DeployFinished(DeployRecord),
    DeployFailed {
        target: TargetKind,
        message: String,
    },
}

struct App {
    workspace: Workspace,
    config: ConfigFolder,
    theme: TuiTheme,
    editor: EditorBuffer,
    focus: PaneFocus,
    sidebar_tab: SidebarTab,
    sidebar_index: usize,
    preview: PreviewState,
    preview_width: usize,
    surface: PreviewSurface,
    prompt: Option<InputPrompt>,
    console: Console,
    console_visible: bool,
    console_input: String,
    notifications: Vec<Notification>,
    layout: LayoutState,
    auto_deploy: AutoDeployFlags,
    github: Option<GithubConnection>,
    netlify: Option<NetlifyConnection>,
    netlify_method: DeployMethod,
    history_github: Vec<DeployRecord>,
    history_netlify: Vec<DeployRecord>,
    publish_in_flight: Option<TargetKind>,
    worker_tx: mpsc::UnboundedSender<WorkerEvent>,
    worker_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    runtime: Option<tokio::runtime::Handle>,
    pending_close: Option<DocumentId>,
    quit_pending: bool,
    should_quit: bool,
}

impl App {
    fn new(
        workspace: Workspace,
        config: ConfigFolder,
        runtime: Option<tokio::runtime::Handle>,
    ) -> Self {
        let layout = config.load_layout().ok().flatten().unwrap_or_default();
        let auto_deploy = config.load_auto_deploy().unwrap_or_default();
        let github = config.load_github_connection().ok().flatten();
        let netlify = config.load_netlify_connection().ok().flatten();
        let history_github = config.history(TargetKind::Github).unwrap_or_default();
        let history_netlify = config.history(TargetKind::Netlify).unwrap_or_default();
        let surface_dir = std::env::temp_dir().join(format!("halimede-{}", std::process::id()));
        let (worker_tx, worker_rx) = mpsc::unbounded_channel();

        let mut editor = EditorBuffer::new();
        if let Some(document) = workspace.active_document() {
            editor.set_text(document.source());
        }

        Self {
            workspace,
            config,
            theme: TuiTheme,
            editor,
            focus: PaneFocus::Editor,
            sidebar_tab: SidebarTab::Files,
            sidebar_index: 0,
            preview: PreviewState::default(),
            preview_width: 80,
            surface: PreviewSurface::new(surface_dir),
            prompt: None,
            console: Console::new(),
            console_visible: false,
            console_input: String::new(),
            notifications: Vec::new(),
            layout,
            auto_deploy,
            github,
            netlify,
            netlify_method: DeployMethod::ZipArchive,
            history_github,
            history_netlify,
            publish_in_flight: None,
            worker_tx,
            worker_rx,
            runtime,
            pending_close: None,
            quit_pending: false,
            should_quit: false,
        }
    }

    fn notify(&mut self, message: impl Into<String>, level: NotifyLevel) {
        self.notifications.push(Notification {
            message: message.into(),
            level,
            created: Instant::now(),
        });
    }

    /// Per-frame upkeep: editor sync, worker events, notification expiry,
    /// preview staleness.
    fn tick(&mut self) {
        if self.editor.take_dirty() {
            let text = self.editor.text();
            if let Some(document) = self.workspace.active_document_mut() {
                document.set_source(text);
            }
        }

        while let Ok(event) = self.worker_rx.try_recv() {
            self.apply_worker_event(event);
        }

        self.notifications
            .retain(|notification| notification.created.elapsed() < NOTIFICATION_TTL);

        self.refresh_preview(false);
    }

    fn apply_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Status { target, message } => {
                self.notify(format!("{}: {message}", target.label()), NotifyLevel::Info);
            }
            WorkerEvent::GithubConnected(connection) => {
                let slug = connection.repo_slug();
                if let Err(err) = self.config.save_github_connection(&connection) {
                    self.notify(format!("Cannot persist connection: {err}"), NotifyLevel::Warning);
                }
                self.github = Some(connection);
                self.notify(format!("Connected to {slug}"), NotifyLevel::Success);
            }
            WorkerEvent::NetlifyConnected(connection, site) => {
                if let Err(err) = self.config.save_netlify_connection(&connection) {
                    self.notify(format!("Cannot persist connection: {err}"), NotifyLevel::Warning);
                }
                self.netlify = Some(connection);
                self.notify(format!("Connected to {site}"), NotifyLevel::Success);
            }
            WorkerEvent::ConnectFailed { target, message } => {
                self.notify(
                    format!("{} connection failed: {message}", target.label()),
                    NotifyLevel::Error,
                );
            }
            WorkerEvent::DeployFinished(record) => {
                self.publish_in_flight = None;
                let target = record.target;
                match self.config.record_deploy(target, record) {
                    Ok(history) => match target {
                        TargetKind::Github => self.history_github = history,
                        TargetKind::Netlify => self.history_netlify = history,
                    },
                    Err(err) => {
                        self.notify(format!("Cannot persist history: {err}"), NotifyLevel::Warning)
                    }
                }
                self.notify(
                    format!("{} deployment successful", target.label()),
                    NotifyLevel::Success,
                );
            }
            WorkerEvent::DeployFailed { target, message } => {
                self.publish_in_flight = None;
                self.notify(
                    format!("{} deployment failed: {message}", target.label()),
                    NotifyLevel::Error,
                );
            }
        }
    }

    /// Re-derives the preview when the active document's revision moved.
    /// Element selection survives a refresh only if the node still exists.
    fn refresh_preview(&mut self, force: bool) {
        let Some(document) = self.workspace.active_document() else {
            self.preview = PreviewState::default();
            return;
        };
        if !document.kind().has_preview() {
            self.preview = PreviewState::default();
            return;
        }

        let key = (document.document_id().clone(), document.rev());
        if !force && self.preview.rendered.as_ref() == Some(&key) {
            return;
        }

        let source = document.source().to_owned();
        let tree = parse_document(&source);
        let render = render_preview(
            &source,
            &tree,
            &RenderOptions {
                width: self.preview_width,
            },
        );

        if let Some(selected) = self.preview.selected {
            if !render.index.contains_key(&selected) {
                self.preview.selected = None;
            }
        }
        let max_scroll = render.lines.len().saturating_sub(1);
        self.preview.scroll = self.preview.scroll.min(max_scroll);
        self.preview.render = Some(render);
        self.preview.tree = Some(tree);
        self.preview.rendered = Some(key);
    }

    fn any_modified(&self) -> bool {
        self.workspace
            .documents()
            .values()
            .any(|document| document.is_modified())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return;
        }
        if self.console_visible {
            self.handle_console_key(key);
            return;
        }
        if self.handle_global_key(key) {
            return;
        }
        match self.focus {
            PaneFocus::Editor => {
                self.editor.handle_key(key);
            }
            PaneFocus::Preview => self.handle_preview_key(key),
            PaneFocus::Sidebar => self.handle_sidebar_key(key),
        }
    }

    /// App-level chords that take precedence over pane input. Returns true
    /// when the key was consumed.
    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    PaneFocus::Sidebar => PaneFocus::Editor,
                    PaneFocus::Editor => {
                        if self.layout.preview_visible {
                            PaneFocus::Preview
                        } else {
                            PaneFocus::Sidebar
                        }
                    }
                    PaneFocus::Preview => PaneFocus::Sidebar,
                };
                true
            }
            KeyCode::Char('q') if ctrl => {
                if self.any_modified() && !self.quit_pending {
                    self.quit_pending = true;
                    self.notify(
                        "Unsaved changes — press Ctrl+Q again to quit",
                        NotifyLevel::Warning,
                    );
                } else {
                    self.should_quit = true;
                }
                true
            }
            KeyCode::Char('s') if ctrl => {
                self.save_active_document();
                true
            }
            KeyCode::Char('r') if ctrl => {
                self.refresh_preview(true);
                self.notify("Preview refreshed", NotifyLevel::Info);
                true
            }
            KeyCode::Char('e') if ctrl => {
                self.export_active_document();
                true
            }
            KeyCode::Char('o') if ctrl => {
                self.prompt = Some(InputPrompt::new(
                    "Open file or folder (path)",
                    "",
                    PromptPurpose::OpenPath,
                ));
                true
            }
            KeyCode::Char('t') if ctrl => {
                self.console_visible = true;
                true
            }
            KeyCode::Char('b') if ctrl => {
                self.layout.preview_visible = !self.layout.preview_visible;
                if !self.layout.preview_visible && self.focus == PaneFocus::Preview {
                    self.focus = PaneFocus::Editor;
                }
                self.persist_layout();
                true
            }
            KeyCode::Left if ctrl => {
                self.layout.editor_percent =
                    (self.layout.editor_percent.saturating_sub(5)).max(MIN_EDITOR_PERCENT);
                self.persist_layout();
                true
            }
            KeyCode::Right if ctrl => {
                self.layout.editor_percent =
                    (self.layout.editor_percent + 5).min(MAX_EDITOR_PERCENT);
                self.persist_layout();
                true
            }
            _ => false,
        }
    }

    fn persist_layout(&mut self) {
        if let Err(err) = self.config.save_layout(&self.layout) {
            self.notify(format!("Cannot persist layout: {err}"), NotifyLevel::Warning);
        }
    }

    fn save_active_document(&mut self) {
        let Some(document) = self.workspace.active_document_mut() else {
            self.notify("No file to save", NotifyLevel::Warning);
            return;
        };
        let name = document.name().to_owned();
        document.mark_saved();
        self.notify(format!("Saved {name}"), NotifyLevel::Success);

        if self.auto_deploy.github && self.github.is_some() {
            self.spawn_deploy(TargetKind::Github, true);
        }
        if self.auto_deploy.netlify && self.netlify.is_some() {
            self.spawn_deploy(TargetKind::Netlify, true);
        }
    }

    fn export_active_document(&mut self) {
        let Some(document) = self.workspace.active_document() else {
            self.notify("No file to export", NotifyLevel::Warning);
            return;
        };
        let name = document.name().to_owned();
        match std::fs::write(&name, document.source()) {
            Ok(()) => self.notify(format!("Exported {name}"), NotifyLevel::Success),
            Err(err) => self.notify(format!("Export failed: {err}"), NotifyLevel::Error),
        }
    }

    fn handle_preview_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') if !self.preview.visual_mode => {
                self.preview.scroll = self.preview.scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') if !self.preview.visual_mode => {
                self.preview.scroll += 1;
            }
            KeyCode::PageUp => self.preview.scroll = self.preview.scroll.saturating_sub(20),
            KeyCode::PageDown => self.preview.scroll += 20,
            KeyCode::Char('v') => {
                self.preview.visual_mode = !self.preview.visual_mode;
                if self.preview.visual_mode {
                    self.select_adjacent_element(1);
                    self.notify(
                        "Visual editing on — n/p select, Enter edits",
                        NotifyLevel::Info,
                    );
                } else {
                    self.preview.selected = None;
                    self.notify("Visual editing off", NotifyLevel::Info);
                }
            }
            KeyCode::Char('n') | KeyCode::Down if self.preview.visual_mode => {
                self.select_adjacent_element(1);
            }
            KeyCode::Char('p') | KeyCode::Up if self.preview.visual_mode => {
                self.select_adjacent_element(-1);
            }
            KeyCode::Enter if self.preview.visual_mode => self.begin_visual_edit(),
            KeyCode::Char('o') => self.open_snapshot(),
            _ => {}
        }
    }

    fn open_snapshot(&mut self) {
        let Some(document) = self.workspace.active_document() else {
            return;
        };
        let source = document.source().to_owned();
        match self.surface.refresh(&source) {
            Ok(path) => {
                let path = path.display().to_string();
                self.notify(format!("Snapshot written to {path}"), NotifyLevel::Info);
            }
            Err(err) => self.notify(format!("Snapshot failed: {err}"), NotifyLevel::Error),
        }
    }

    fn select_adjacent_element(&mut self, direction: i64) {
        let Some(render) = &self.preview.render else {
            return;
        };
        let order = render.nodes_in_render_order();
        if order.is_empty() {
            self.preview.selected = None;
            return;
        }
        let next = match self.preview.selected {
            None => 0,
            Some(current) => {
                let position = order.iter().position(|&node| node == current).unwrap_or(0);
                let len = order.len() as i64;
                ((position as i64 + direction).rem_euclid(len)) as usize
            }
        };
        self.preview.selected = Some(order[next]);
        self.scroll_selected_into_view();
    }

    fn scroll_selected_into_view(&mut self) {
        let Some(render) = &self.preview.render else {
            return;
        };
        let Some(selected) = self.preview.selected else {
            return;
        };
        if let Some(&(line, _, _)) = render.index.get(&selected).and_then(|spans| spans.first()) {
            if line < self.preview.scroll {
                self.preview.scroll = line;
            } else if line >= self.preview.scroll + 20 {
                self.preview.scroll = line.saturating_sub(10);
            }
        }
    }

    /// Opens the edit prompt for the selected element, creating the edit
    /// session that pins the element handle to the current revision.
    fn begin_visual_edit(&mut self) {
        let Some(selected) = self.preview.selected else {
            self.notify("No element selected", NotifyLevel::Warning);
            return;
        };
        let (Some(tree), Some(document)) = (&self.preview.tree, self.workspace.active_document())
        else {
            return;
        };
        let Some(node) = tree.node(selected) else {
            return;
        };
        let Some(tag) = node.tag() else {
            return;
        };
        if !is_editable_tag(tag) {
            self.notify(format!("<{tag}> is not editable"), NotifyLevel::Warning);
            return;
        }
        let Some(path) = path_of(tree, selected) else {
            return;
        };
        let Some(content_span) = node.content_span() else {
            return;
        };

        let original = content_span.slice(document.source()).to_owned();
        let session = EditSession::new(
            document.document_id().clone(),
            document.rev(),
            path,
            smol_str::SmolStr::new(tag),
            original.clone(),
        );
        let attrs = node.attrs().to_vec();
        self.workspace.begin_edit_session(session);
        self.prompt = Some(InputPrompt::new(
            format!("Edit <{tag}> content"),
            original,
            PromptPurpose::EditElement { attrs },
        ));
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(mut prompt) = self.prompt.take() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                if matches!(prompt.purpose, PromptPurpose::EditElement { .. }) {
                    self.workspace.take_edit_session();
                    self.notify("Editing cancelled", NotifyLevel::Info);
                }
            }
            KeyCode::Enter => {
                self.submit_prompt(prompt);
            }
            KeyCode::Backspace => {
                if prompt.cursor > 0 {
                    let at = byte_index(&prompt.value, prompt.cursor - 1);
                    prompt.value.remove(at);
                    prompt.cursor -= 1;
                }
                self.prompt = Some(prompt);
            }
            KeyCode::Left => {
                prompt.cursor = prompt.cursor.saturating_sub(1);
                self.prompt = Some(prompt);
            }
            KeyCode::Right => {
                prompt.cursor = (prompt.cursor + 1).min(prompt.value.chars().count());
                self.prompt = Some(prompt);
            }
            KeyCode::Home => {
                prompt.cursor = 0;
                self.prompt = Some(prompt);
            }
            KeyCode::End => {
                prompt.cursor = prompt.value.chars().count();
                self.prompt = Some(prompt);
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let at = byte_index(&prompt.value, prompt.cursor);
                prompt.value.insert(at, ch);
                prompt.cursor += 1;
                self.prompt = Some(prompt);
            }
            _ => self.prompt = Some(prompt),
        }
    }

    fn submit_prompt(&mut self, prompt: InputPrompt) {
        match prompt.purpose {
            PromptPurpose::EditElement { attrs } => {
                self.commit_visual_edit(&prompt.value, &attrs);
            }
            PromptPurpose::OpenPath => self.open_path(prompt.value.trim()),
            PromptPurpose::Connect {
                target,
                step,
                mut draft,
            } => {
                draft.push(prompt.value.trim().to_owned());
                let fields = connect_fields(target);
                if step + 1 < fields.len() {
                    self.prompt = Some(InputPrompt::new(
                        fields[step + 1],
                        "",
                        PromptPurpose::Connect {
                            target,
                            step: step + 1,
                            draft,
                        },
                    ));
                } else {
                    self.finish_connect(target, draft);
                }
            }
        }
    }

    fn commit_visual_edit(&mut self, new_content: &str, attrs: &[Attribute]) {
        let Some(session) = self.workspace.take_edit_session() else {
            return;
        };
        let document_id = session.document_id().clone();
        let Some(document) = self.workspace.document_mut(&document_id) else {
            self.notify("Document closed during edit", NotifyLevel::Error);
            return;
        };

        match commit_edit(document, &session, new_content, attrs) {
            Ok(result) => {
                let source = document.source().to_owned();
                self.editor.set_text(&source);
                // set_text clears the change flag; the document was already
                // updated by the commit itself.
                self.editor.take_dirty();
                match result.strategy {
                    MatchStrategy::ContentFirst { candidates } => self.notify(
                        format!("Replaced the first of {candidates} identical elements"),
                        NotifyLevel::Warning,
                    ),
                    _ => self.notify("Changes saved to editor", NotifyLevel::Success),
                }
                self.refresh_preview(true);
            }
            Err(EditError::Conflict { .. }) => {
                self.notify(
                    "Source changed while editing — edit discarded",
                    NotifyLevel::Error,
                );
            }
            Err(err) => self.notify(format!("Edit not applied: {err}"), NotifyLevel::Error),
        }
    }

    fn open_path(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let path = std::path::PathBuf::from(raw);
        let report = if path.is_dir() {
            ingest::ingest_dir(&path)
        } else {
            ingest::ingest_files(std::slice::from_ref(&path))
        };
        match report {
            Ok(report) => {
                let loaded = report.files.len();
                for rejection in &report.rejected {
                    self.notify(rejection.to_string(), NotifyLevel::Warning);
                }
                ingest::apply_report(&mut self.workspace, &report);
                if let Some(document) = self.workspace.active_document() {
                    let text = document.source().to_owned();
                    self.editor.set_text(&text);
                }
                self.refresh_preview(true);
                self.notify(format!("Loaded {loaded} files"), NotifyLevel::Success);
            }
            Err(err) => self.notify(format!("Load failed: {err}"), NotifyLevel::Error),
        }
    }

    fn finish_connect(&mut self, target: TargetKind, draft: Vec<String>) {
        match target {
            TargetKind::Github => {
                let [token, owner, repo, branch, file_path] = draft.as_slice() else {
                    return;
                };
                if token.is_empty() || owner.is_empty() || repo.is_empty() || file_path.is_empty() {
                    self.notify("Please fill in all required fields", NotifyLevel::Error);
                    return;
                }
                let connection = GithubConnection {
                    token: token.clone(),
                    owner: owner.clone(),
                    repo: repo.clone(),
                    branch: if branch.is_empty() {
                        "main".to_owned()
                    } else {
                        branch.clone()
                    },
                    file_path: file_path.clone(),
                };
                self.spawn_github_connect(connection);
            }
            TargetKind::Netlify => {
                let [token, site_name] = draft.as_slice() else {
                    return;
                };
                if token.is_empty() {
                    self.notify("Please enter your access token", NotifyLevel::Error);
                    return;
                }
                let connection = NetlifyConnection {
                    token: token.clone(),
                    site_id: None,
                    site_name: (!site_name.is_empty()).then(|| site_name.clone()),
                };
                self.spawn_netlify_connect(connection);
            }
        }
    }

    fn spawn_github_connect(&mut self, connection: GithubConnection) {
        let Some(runtime) = self.runtime.clone() else {
            self.notify("No async runtime available", NotifyLevel::Error);
            return;
        };
        let tx = self.worker_tx.clone();
        runtime.spawn(async move {
            let result = async {
                let client = GithubClient::new(connection.clone())?;
                client.authenticate().await
            }
            .await;
            let event = match result {
                Ok(()) => WorkerEvent::GithubConnected(connection),
                Err(err) => WorkerEvent::ConnectFailed {
                    target: TargetKind::Github,
                    message: err.to_string(),
                },
            };
            let _ = tx.send(event);
        });
    }

    fn spawn_netlify_connect(&mut self, connection: NetlifyConnection) {
        let Some(runtime) = self.runtime.clone() else {
            self.notify("No async runtime available", NotifyLevel::Error);
            return;
        };
        let tx = self.worker_tx.clone();
        runtime.spawn(async move {
            let result = async {
                let client = NetlifyClient::new(connection.token.clone())?;
                let user = client.authenticate().await?;
                let site = client
                    .find_or_create_site(connection.site_name.as_deref())
                    .await?;
                Ok::<_, crate::publish::PublishError>((user, site))
            }
            .await;
            let event = match result {
                Ok((user, site)) => {
                    let connected = NetlifyConnection {
                        token: connection.token,
                        site_id: Some(site.id.clone()),
                        site_name: Some(site.name.clone()),
                    };
                    WorkerEvent::NetlifyConnected(
                        connected,
                        format!("{} as {}", site.name, user.display_name()),
                    )
                }
                Err(err) => WorkerEvent::ConnectFailed {
                    target: TargetKind::Netlify,
                    message: err.to_string(),
                },
            };
            let _ = tx.send(event);
        });
    }

    /// One deploy at a time; the affordance is disabled while in flight.
    fn spawn_deploy(&mut self, target: TargetKind, automatic: bool) {
        if self.publish_in_flight.is_some() {
            if !automatic {
                self.notify("A deployment is already running", NotifyLevel::Warning);
            }
            return;
        }
        let kind_label = if automatic { "Auto-deployment" } else { "Deployment" };

        match target {
            TargetKind::Github => {
                let Some(connection) = self.github.clone() else {
                    self.notify("Not connected to GitHub", NotifyLevel::Error);
                    return;
                };
                let Some(document) = self.workspace.active_document() else {
                    self.notify("No file to deploy", NotifyLevel::Warning);
                    return;
                };
                let Some(runtime) = self.runtime.clone() else {
                    self.notify("No async runtime available", NotifyLevel::Error);
                    return;
                };
                let mut files = FileSet::new();
                files.insert(
                    connection.file_path.clone(),
                    document.source().as_bytes().to_vec(),
                );
                let message = if automatic {
                    format!("Auto-update {} via Halimede", document.name())
                } else {
                    format!("Update {} via Halimede", document.name())
                };

                self.publish_in_flight = Some(target);
                let tx = self.worker_tx.clone();
                let label = kind_label.to_owned();
                runtime.spawn(async move {
                    let _ = tx.send(WorkerEvent::Status {
                        target,
                        message: format!("{label} starting..."),
                    });
                    let result = async {
                        let client = GithubClient::new(connection)?;
                        client.publish(&files, &message).await
                    }
                    .await;
                    let event = match result {
                        Ok(record) => WorkerEvent::DeployFinished(record),
                        Err(err) => WorkerEvent::DeployFailed {
                            target,
                            message: err.to_string(),
                        },
                    };
                    let _ = tx.send(event);
                });
            }
            TargetKind::Netlify => {
                let Some(connection) = self.netlify.clone() else {
                    self.notify("Not connected to Netlify", NotifyLevel::Error);
                    return;
                };
                let Some(site_id) = connection.site_id.clone() else {
                    self.notify("Netlify site not resolved yet", NotifyLevel::Error);
                    return;
                };
                let files = FileSet::from_workspace(&self.workspace);
                if files.is_empty() {
                    self.notify("No files to deploy", NotifyLevel::Warning);
                    return;
                }
                let Some(runtime) = self.runtime.clone() else {
                    self.notify("No async runtime available", NotifyLevel::Error);
                    return;
                };
                let method = self.netlify_method;
                let message = if automatic {
                    "Auto-deployment via Halimede".to_owned()
                } else {
                    "Deployment via Halimede".to_owned()
                };

                self.publish_in_flight = Some(target);
                let tx = self.worker_tx.clone();
                let label = kind_label.to_owned();
                runtime.spawn(async move {
                    let _ = tx.send(WorkerEvent::Status {
                        target,
                        message: format!("{label} starting..."),
                    });
                    let result = async {
                        let client = NetlifyClient::new(connection.token.clone())?;
                        client.deploy(&site_id, &files, method, &message).await
                    }
                    .await;
                    let event = match result {
                        Ok(record) => WorkerEvent::DeployFinished(record),
                        Err(err) => WorkerEvent::DeployFailed {
                            target,
                            message: err.to_string(),
                        },
                    };
                    let _ = tx.send(event);
                });
            }
        }
    }

    fn disconnect_target(&mut self, target: TargetKind) {
        if let Err(err) = self.config.clear_target(target) {
            self.notify(format!("Cannot clear credentials: {err}"), NotifyLevel::Warning);
        }
        self.auto_deploy.set(target, false);
        match target {
            TargetKind::Github => {
                self.github = None;
                self.history_github.clear();
            }
            TargetKind::Netlify => {
                self.netlify = None;
                self.history_netlify.clear();
            }
        }
        self.notify(
            format!("Disconnected from {}", target.label()),
            NotifyLevel::Info,
        );
    }

    fn toggle_auto_deploy(&mut self, target: TargetKind) {
        let enabled = !self.auto_deploy.get(target);
        self.auto_deploy.set(target, enabled);
        if let Err(err) = self.config.save_auto_deploy(&self.auto_deploy) {
            self.notify(format!("Cannot persist flags: {err}"), NotifyLevel::Warning);
        }
        self.notify(
            if enabled {
                "Auto-deployment enabled — files deploy on save"
            } else {
                "Auto-deployment disabled"
            },
            NotifyLevel::Info,
        );
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('1') => self.sidebar_tab = SidebarTab::Files,
            KeyCode::Char('2') => self.sidebar_tab = SidebarTab::Github,
            KeyCode::Char('3') => self.sidebar_tab = SidebarTab::Netlify,
            _ => {}
        }
        match self.sidebar_tab {
            SidebarTab::Files => self.handle_files_key(key),
            SidebarTab::Github => self.handle_target_key(key, TargetKind::Github),
            SidebarTab::Netlify => self.handle_target_key(key, TargetKind::Netlify),
        }
    }

    fn handle_files_key(&mut self, key: KeyEvent) {
        let entry_count = self.workspace.tree().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar_index = self.sidebar_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if entry_count > 0 {
                    self.sidebar_index = (self.sidebar_index + 1).min(entry_count - 1);
                }
            }
            KeyCode::Enter => {
                let selected = self
                    .workspace
                    .tree()
                    .values()
                    .nth(self.sidebar_index)
                    .and_then(|entry| entry.document_id().cloned());
                match selected {
                    Some(document_id) => self.switch_to_document(document_id),
                    None => self.notify("Binary files cannot be edited", NotifyLevel::Warning),
                }
            }
            KeyCode::Char('x') => {
                let selected = self
                    .workspace
                    .tree()
                    .values()
                    .nth(self.sidebar_index)
                    .and_then(|entry| entry.document_id().cloned());
                if let Some(document_id) = selected {
                    self.close_document(document_id);
                }
            }
            _ => {}
        }
    }

    fn switch_to_document(&mut self, document_id: DocumentId) {
        let Some(document) = self.workspace.document(&document_id) else {
            return;
        };
        let text = document.source().to_owned();
        self.workspace.set_active_document_id(Some(document_id));
        self.editor.set_text(&text);
        self.preview = PreviewState::default();
        self.refresh_preview(true);
    }

    /// Closing a modified document asks for a second confirmation press.
    fn close_document(&mut self, document_id: DocumentId) {
        let modified = self
            .workspace
            .document(&document_id)
            .is_some_and(|document| document.is_modified());
        if modified && self.pending_close.as_ref() != Some(&document_id) {
            self.pending_close = Some(document_id);
            self.notify(
                "Unsaved changes — press x again to close anyway",
                NotifyLevel::Warning,
            );
            return;
        }
        self.pending_close = None;
        self.workspace.close_document(&document_id);
        self.sidebar_index = self
            .sidebar_index
            .min(self.workspace.tree().len().saturating_sub(1));
        match self.workspace.active_document() {
            Some(document) => {
                let text = document.source().to_owned();
                self.editor.set_text(&text);
            }
            None => self.editor.set_text(""),
        }
        self.refresh_preview(true);
    }

    fn handle_target_key(&mut self, key: KeyEvent, target: TargetKind) {
        match key.code {
            KeyCode::Char('c') => {
                let fields = connect_fields(target);
                self.prompt = Some(InputPrompt::new(
                    fields[0],
                    "",
                    PromptPurpose::Connect {
                        target,
                        step: 0,
                        draft: Vec::new(),
                    },
                ));
            }
            KeyCode::Char('d') => self.spawn_deploy(target, false),
            KeyCode::Char('a') => self.toggle_auto_deploy(target),
            KeyCode::Char('x') => self.disconnect_target(target),
            KeyCode::Char('m') if target == TargetKind::Netlify => {
                self.netlify_method = match self.netlify_method {
                    DeployMethod::ZipArchive => DeployMethod::FileDigest,
                    DeployMethod::FileDigest => DeployMethod::ZipArchive,
                };
                let label = match self.netlify_method {
                    DeployMethod::ZipArchive => "ZIP archive",
                    DeployMethod::FileDigest => "file digest",
                };
                self.notify(format!("Deploy method: {label}"), NotifyLevel::Info);
            }
            _ => {}
        }
    }

    fn handle_console_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.console_visible = false;
                self.console_input.clear();
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.console_input);
                match self.console.execute(&line) {
                    ConsoleOutcome::Exit => self.console_visible = false,
                    ConsoleOutcome::Clear | ConsoleOutcome::Output => {}
                }
            }
            KeyCode::Backspace => {
                self.console_input.pop();
            }
            KeyCode::Up => {
                if let Some(previous) = self.console.history_previous() {
                    self.console_input = previous.to_owned();
                }
            }
            KeyCode::Down => {
                self.console_input = self
                    .console
                    .history_next()
                    .map(str::to_owned)
                    .unwrap_or_default();
            }
            KeyCode::Tab => {
                if let Completion::Single(name) = complete(&self.console_input) {
                    self.console_input = name;
                }
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.console_input.push(ch);
            }
            _ => {}
        }
    }
}

fn connect_fields(target: TargetKind) -> &'static [&'static str] {
    match target {
        TargetKind::Github => &[
            "GitHub personal access token",
            "Repository owner",
            "Repository name",
            "Branch (default: main)",
            "File path in repo",
        ],
        TargetKind::Netlify => &["Netlify personal access token", "Site name (optional)"],
    }
}

fn byte_index(text: &str, col: usize) -> usize {
    text.char_indices()
        .nth(col)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_owned();
    }
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn format_time_ago(timestamp_ms: u64) -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0);
    let diff_mins = now_ms.saturating_sub(timestamp_ms) / 60_000;
    match diff_mins {
        0 => "just now".to_owned(),
        1..=59 => format!("{diff_mins}m ago"),
        60..=1439 => format!("{}h ago", diff_mins / 60),
        _ => format!("{}d ago", diff_mins / 1440),
    }
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_header(frame, app, outer[0]);
    draw_body(frame, app, outer[1]);
    draw_footer(frame, app, outer[2]);
    draw_notifications(frame, app, outer[1]);

    if app.console_visible {
        draw_console(frame, app, outer[1]);
    }
    if app.prompt.is_some() {
        draw_prompt(frame, app, outer[1]);
    }
}

fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let project = app.workspace.project_name().unwrap_or("no project");
    let document = match app.workspace.active_document() {
        Some(document) if document.is_modified() => format!("● {}", document.name()),
        Some(document) => document.name().to_owned(),
        None => "no file".to_owned(),
    };
    let mut badges = Vec::new();
    if app.github.is_some() {
        badges.push("gh");
    }
    if app.netlify.is_some() {
        badges.push("nl");
    }
    let badges = if badges.is_empty() {
        String::new()
    } else {
        format!("  [{}]", badges.join(","))
    };
    let header = format!(" Halimede — {project} — {document}{badges}");
    frame.render_widget(
        Paragraph::new(header).style(app.theme.title_style()),
        area,
    );
}

fn draw_body(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let editor_percent = app.layout.editor_percent;
    let constraints = if app.layout.preview_visible {
        vec![
            Constraint::Length(SIDEBAR_WIDTH),
            Constraint::Percentage(editor_percent),
            Constraint::Min(10),
        ]
    } else {
        vec![Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)]
    };
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    draw_sidebar(frame, app, panes[0]);
    draw_editor(frame, app, panes[1]);
    if app.layout.preview_visible {
        draw_preview(frame, app, panes[2]);
    }
}

fn draw_sidebar(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let focused = app.focus == PaneFocus::Sidebar;
    let title = match app.sidebar_tab {
        SidebarTab::Files => " [1] Files  2 GitHub  3 Netlify ",
        SidebarTab::Github => "  1 Files [2] GitHub  3 Netlify ",
        SidebarTab::Netlify => "  1 Files  2 GitHub [3] Netlify ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_style(focused))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match app.sidebar_tab {
        SidebarTab::Files => files_tab_lines(app, inner.width as usize),
        SidebarTab::Github => target_tab_lines(app, TargetKind::Github),
        SidebarTab::Netlify => target_tab_lines(app, TargetKind::Netlify),
    };
    frame.render_widget(Paragraph::new(lines), inner);
}

fn files_tab_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    if app.workspace.tree().is_empty() {
        return vec![
            Line::from("No project loaded".to_owned()),
            Line::styled("Ctrl+O opens a file or folder".to_owned(), app.theme.dim_style()),
        ];
    }

    let mut lines = Vec::new();
    for (row, (path, entry)) in app.workspace.tree().iter().enumerate() {
        let selected = app.focus == PaneFocus::Sidebar
            && app.sidebar_tab == SidebarTab::Files
            && row == app.sidebar_index;
        let marker = if entry.is_editable() { " " } else { "·" };
        let size = format_file_size(entry.size());
        let name_width = width.saturating_sub(size.len() + 3);
        let label = format!(
            "{marker}{:<name_width$} {size}",
            truncate_with_ellipsis(path, name_width)
        );
        let style = if selected {
            app.theme.selection_style()
        } else if entry.is_editable() {
            app.theme.base_style()
        } else {
            app.theme.dim_style()
        };
        lines.push(Line::styled(label, style));
    }
    lines
}

fn target_tab_lines(app: &App, target: TargetKind) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let mut lines = Vec::new();

    let (connected_label, history) = match target {
        TargetKind::Github => (
            app.github
                .as_ref()
                .map(|connection| format!("Connected to {}", connection.repo_slug())),
            &app.history_github,
        ),
        TargetKind::Netlify => (
            app.netlify.as_ref().map(|connection| {
                format!(
                    "Connected to {}",
                    connection.site_name.as_deref().unwrap_or("(site pending)")
                )
            }),
            &app.history_netlify,
        ),
    };

    match connected_label {
        Some(label) => lines.push(Line::styled(format!("● {label}"), theme.success_style())),
        None => lines.push(Line::styled("○ Not connected".to_owned(), theme.dim_style())),
    }
    if let (TargetKind::Github, Some(connection)) = (target, app.github.as_ref()) {
        lines.push(Line::styled(
            format!("  {} → {}", connection.branch, connection.file_path),
            theme.dim_style(),
        ));
    }
    if target == TargetKind::Netlify {
        let method = match app.netlify_method {
            DeployMethod::ZipArchive => "ZIP archive",
            DeployMethod::FileDigest => "file digest",
        };
        lines.push(Line::styled(format!("  method: {method}"), theme.dim_style()));
    }
    let auto = if app.auto_deploy.get(target) { "on" } else { "off" };
    lines.push(Line::from(format!("  auto-deploy on save: {auto}")));
    if app.publish_in_flight == Some(target) {
        lines.push(Line::styled(
            "  deployment in progress...".to_owned(),
            theme.warning_style(),
        ));
    }
    lines.push(Line::from(String::new()));
    lines.push(Line::styled("Recent deployments".to_owned(), theme.title_style()));
    if history.is_empty() {
        lines.push(Line::styled("  no deployments yet".to_owned(), theme.dim_style()));
    }
    for record in history.iter().take(10) {
        let when = format_time_ago(record.timestamp_ms);
        let id = truncate_with_ellipsis(record.id.as_str(), 8);
        lines.push(Line::from(format!("  ✓ {id}  {when}")));
        if let Some(url) = &record.url {
            lines.push(Line::styled(format!("    {url}"), theme.info_style()));
        }
    }
    lines.push(Line::from(String::new()));
    lines.push(Line::styled(
        "c connect  d deploy  a auto  x disconnect".to_owned(),
        theme.dim_style(),
    ));
    if target == TargetKind::Netlify {
        lines.push(Line::styled("m toggle deploy method".to_owned(), theme.dim_style()));
    }
    lines
}

fn draw_editor(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let focused = app.focus == PaneFocus::Editor;
    let (cursor_line, cursor_col) = app.editor.cursor();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_style(focused))
        .title(format!(" Editor — Ln {}, Col {} ", cursor_line + 1, cursor_col + 1));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    app.editor.scroll_to_cursor(height);
    let scroll = app.editor.scroll();
    let gutter_width = {
        let mut buffer = itoa::Buffer::new();
        buffer.format(app.editor.lines().len()).len().max(3)
    };

    let mut lines = Vec::new();
    for (offset, text) in app.editor.lines().iter().skip(scroll).take(height).enumerate() {
        let mut number = itoa::Buffer::new();
        let number = number.format(scroll + offset + 1);
        lines.push(Line::from(vec![
            Span::styled(
                format!("{number:>gutter_width$} "),
                app.theme.dim_style(),
            ),
            Span::raw(text.clone()),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    if focused && app.prompt.is_none() && !app.console_visible {
        let (line, col) = app.editor.cursor();
        let x = inner.x + (gutter_width + 1) as u16 + col as u16;
        let y = inner.y + (line - scroll) as u16;
        if x < inner.right() && y < inner.bottom() {
            frame.set_cursor(x, y);
        }
    }
}

fn draw_preview(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let focused = app.focus == PaneFocus::Preview;
    let title = if app.preview.visual_mode {
        " Preview [visual] "
    } else {
        " Preview "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_style(focused))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // The render is derived at the pane's width; remember it for the next
    // refresh.
    let width = inner.width.max(16) as usize;
    if width != app.preview_width {
        app.preview_width = width;
        app.preview.rendered = None;
        app.refresh_preview(false);
    }

    let Some(render) = &app.preview.render else {
        let placeholder = match app.workspace.active_document() {
            Some(document) => format!("no preview for .{} files", document.kind().label()),
            None => "no document".to_owned(),
        };
        frame.render_widget(
            Paragraph::new(placeholder).style(app.theme.dim_style()),
            inner,
        );
        return;
    };

    let height = inner.height as usize;
    let max_scroll = render.lines.len().saturating_sub(height);
    app.preview.scroll = app.preview.scroll.min(max_scroll);
    let scroll = app.preview.scroll;

    let selected_spans: Vec<(usize, usize, usize)> = app
        .preview
        .selected
        .and_then(|node| render.index.get(&node).cloned())
        .unwrap_or_default();

    let mut lines = Vec::new();
    for (offset, text) in render.lines.iter().skip(scroll).take(height).enumerate() {
        let line_no = scroll + offset;
        let highlights: Vec<(usize, usize)> = selected_spans
            .iter()
            .filter(|(line, _, _)| *line == line_no)
            .map(|(_, x0, x1)| (*x0, *x1))
            .collect();
        if highlights.is_empty() {
            lines.push(Line::raw(text.clone()));
        } else {
            lines.push(highlighted_line(
                text,
                &highlights,
                app.theme.selection_style(),
            ));
        }
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Splits one rendered line into styled spans for the given char ranges
/// (inclusive).
fn highlighted_line(text: &str, highlights: &[(usize, usize)], style: Style) -> Line<'static> {
    let chars: Vec<char> = text.chars().collect();
    let mut flags = vec![false; chars.len()];
    for &(x0, x1) in highlights {
        for flag in flags.iter_mut().take(x1.min(chars.len().saturating_sub(1)) + 1).skip(x0) {
            *flag = true;
        }
    }

    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_highlighted = false;
    for (index, &ch) in chars.iter().enumerate() {
        let highlighted = flags.get(index).copied().unwrap_or(false);
        if index == 0 {
            run_highlighted = highlighted;
        }
        if highlighted != run_highlighted {
            let segment = std::mem::take(&mut run);
            spans.push(if run_highlighted {
                Span::styled(segment, style)
            } else {
                Span::raw(segment)
            });
            run_highlighted = highlighted;
        }
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(if run_highlighted {
            Span::styled(run, style)
        } else {
            Span::raw(run)
        });
    }
    Line::from(spans)
}

fn draw_footer(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = if app.console_visible {
        &[("Esc", "close"), ("Tab", "complete"), ("↑↓", "history")]
    } else if app.prompt.is_some() {
        &[("Enter", "apply"), ("Esc", "cancel")]
    } else {
        match app.focus {
            PaneFocus::Editor => &[
                ("Tab", "pane"),
                ("^S", "save"),
                ("^O", "open"),
                ("^R", "preview"),
                ("^T", "console"),
                ("^Q", "quit"),
            ],
            PaneFocus::Preview => &[
                ("Tab", "pane"),
                ("v", "visual"),
                ("n/p", "select"),
                ("Enter", "edit"),
                ("o", "snapshot"),
            ],
            PaneFocus::Sidebar => &[
                ("Tab", "pane"),
                ("1/2/3", "tab"),
                ("↑↓", "move"),
                ("Enter", "open"),
                ("x", "close"),
            ],
        }
    };

    let mut spans = vec![Span::styled(FOOTER_BRAND, app.theme.accent_style())];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {key} "), app.theme.footer_key_style()));
        spans.push(Span::styled(format!("{label} "), app.theme.footer_label_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notifications(frame: &mut Frame<'_>, app: &App, area: Rect) {
    for (row, notification) in app.notifications.iter().rev().take(3).enumerate() {
        let text = truncate_with_ellipsis(&notification.message, 48);
        let width = (text.chars().count() as u16 + 2).min(area.width);
        let rect = Rect {
            x: area.right().saturating_sub(width + 1),
            y: area.y + 1 + row as u16,
            width,
            height: 1,
        };
        let style = match notification.level {
            NotifyLevel::Info => app.theme.info_style(),
            NotifyLevel::Success => app.theme.success_style(),
            NotifyLevel::Warning => app.theme.warning_style(),
            NotifyLevel::Error => app.theme.error_style(),
        };
        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(format!(" {text} ")).style(style), rect);
    }
}

fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let width = area.width * width_percent / 100;
    let height = (area.height * height_percent / 100).max(3);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn draw_console(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let rect = centered_rect(area, 80, 70);
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.accent_style())
        .title(" Halimede console ");
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let height = inner.height.saturating_sub(1) as usize;
    let transcript = app.console.transcript();
    let start = transcript.len().saturating_sub(height);
    let mut lines: Vec<Line<'_>> = transcript[start..]
        .iter()
        .map(|line| Line::raw(line.clone()))
        .collect();
    lines.push(Line::styled(
        format!("halimede:~$ {}█", app.console_input),
        app.theme.accent_style(),
    ));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_prompt(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(prompt) = &app.prompt else {
        return;
    };
    let rect = centered_rect(area, 60, 20);
    let rect = Rect {
        height: 3,
        ..rect
    };
    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.accent_style())
        .title(format!(" {} ", prompt.title));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    frame.render_widget(Paragraph::new(prompt.value.clone()), inner);

    let x = inner.x + prompt.cursor.min(inner.width.saturating_sub(1) as usize) as u16;
    frame.set_cursor(x, inner.y);
}
