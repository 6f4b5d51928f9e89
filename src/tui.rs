// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Terminal user interface
//!
//! Three panes: the papers in layout order, the canvas with nodes and
//! dependency lines, and the details of the selected paper (or the edit form
//! while editing). A status line shows messages and an unsaved marker.

use crate::session::{EditState, PaperForm, Session};
use crate::store::DocumentStore;
use crate::types::{Position, ReadingStatus};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Rectangle};
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Distance a node moves per key press
const MOVE_STEP: f64 = 20.0;

const VIEW_HELP: &str =
    "j/k select  e edit  a add  D delete  HJKL move  r relayout  o overlaps  x export  s save  q quit";
const EDIT_HELP: &str = "Tab/Up/Down field  Left/Right cycle  Enter save  Esc cancel";

/// Editable form fields, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Title
    Title,
    /// Authors
    Authors,
    /// Year
    Year,
    /// Venue
    Venue,
    /// Link
    Url,
    /// Notes
    Description,
    /// Reading status
    Status,
    /// Priority
    Priority,
    /// Prerequisite IDs, comma separated
    Dependencies,
    /// Tags, comma separated
    Tags,
}

impl Field {
    const ALL: [Self; 10] = [
        Self::Title,
        Self::Authors,
        Self::Year,
        Self::Venue,
        Self::Url,
        Self::Description,
        Self::Status,
        Self::Priority,
        Self::Dependencies,
        Self::Tags,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Authors => "Authors",
            Self::Year => "Year",
            Self::Venue => "Venue",
            Self::Url => "URL",
            Self::Description => "Notes",
            Self::Status => "Status",
            Self::Priority => "Priority",
            Self::Dependencies => "Requires",
            Self::Tags => "Tags",
        }
    }

    fn is_text(self) -> bool {
        !matches!(self, Self::Status | Self::Priority)
    }

    fn offset(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ALL[(idx + delta).rem_euclid(len) as usize]
    }

    /// Text of this field in a form
    fn text(self, form: &PaperForm) -> String {
        match self {
            Self::Title => form.title.clone().unwrap_or_default(),
            Self::Authors => form.authors.clone().unwrap_or_default(),
            Self::Year => form.year.map(|y| y.to_string()).unwrap_or_default(),
            Self::Venue => form.venue.clone().unwrap_or_default(),
            Self::Url => form.url.clone().unwrap_or_default(),
            Self::Description => form.description.clone().unwrap_or_default(),
            Self::Status => form.status.unwrap_or_default().to_string(),
            Self::Priority => form.priority.unwrap_or_default().to_string(),
            Self::Dependencies => form.dependencies.clone().unwrap_or_default().join(", "),
            Self::Tags => form.tags.clone().unwrap_or_default().join(", "),
        }
    }

    /// Write text back into a form
    fn store(self, form: &mut PaperForm, text: &str) {
        let optional = |t: &str| Some(t.to_string()).filter(|t| !t.is_empty());
        let list = |t: &str| -> Vec<String> {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };
        match self {
            Self::Title => form.title = Some(text.to_string()),
            Self::Authors => form.authors = Some(text.to_string()),
            Self::Year => form.year = text.trim().parse().ok(),
            Self::Venue => form.venue = optional(text),
            Self::Url => form.url = optional(text),
            Self::Description => form.description = optional(text),
            Self::Dependencies => form.dependencies = Some(list(text)),
            Self::Tags => form.tags = Some(list(text)),
            Self::Status | Self::Priority => {}
        }
    }
}

/// Viewer state around a session
pub struct App<'a, S: DocumentStore> {
    session: &'a mut Session<S>,
    selected: usize,
    field: Field,
    buffer: String,
    message: Option<String>,
    export_path: PathBuf,
    quit: bool,
}

impl<'a, S: DocumentStore> App<'a, S> {
    /// Wrap a session
    pub fn new(session: &'a mut Session<S>, export_path: PathBuf) -> Self {
        Self {
            session,
            selected: 0,
            field: Field::Title,
            buffer: String::new(),
            message: None,
            export_path,
            quit: false,
        }
    }

    /// Whether the user asked to leave
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Paper IDs in list order (rank, then order within the rank)
    fn ordered_ids(&self) -> Vec<String> {
        self.session
            .layout()
            .by_rank()
            .into_iter()
            .map(|p| p.id.clone())
            .collect()
    }

    fn selected_id(&self) -> Option<String> {
        self.ordered_ids().into_iter().nth(self.selected)
    }

    fn select_id(&mut self, id: &str) {
        if let Some(idx) = self.ordered_ids().iter().position(|i| i == id) {
            self.selected = idx;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.ordered_ids().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// React to one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if matches!(self.session.state(), EditState::Editing { .. }) {
            self.handle_edit_key(key.code);
        } else {
            self.handle_view_key(key.code);
        }
    }

    fn handle_view_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.ordered_ids().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    let result = self.session.begin_edit(&id).map(|()| format!("Editing {id}"));
                    self.report(result);
                    self.load_field(Field::Title);
                }
            }
            KeyCode::Char('a') => match self.session.add_paper() {
                Ok(id) => {
                    self.select_id(&id);
                    self.load_field(Field::Title);
                    self.message = Some(format!("Added {id}"));
                }
                Err(e) => self.message = Some(e.to_string()),
            },
            KeyCode::Char('D') => {
                if let Some(id) = self.selected_id() {
                    let result = self.session.delete_paper(&id).map(|()| format!("Deleted {id}"));
                    self.report(result);
                    self.clamp_selection();
                }
            }
            KeyCode::Char(c @ ('H' | 'J' | 'K' | 'L')) => self.nudge(c),
            KeyCode::Char('r') => {
                self.session.relayout();
                self.message = Some("Layout recomputed".into());
            }
            KeyCode::Char('o') => {
                let moves = self.session.fix_overlaps();
                self.message = Some(format!("Overlap correction: {moves} moves"));
            }
            KeyCode::Char('x') => {
                let result = self.export();
                self.report(result);
            }
            KeyCode::Char('s') => {
                let result = self.session.flush().map(|()| "Saved".to_string());
                self.report(result);
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.session.cancel_edit();
                self.message = Some("Edit cancelled".into());
            }
            KeyCode::Enter => {
                self.commit_field();
                match self.session.save_edit() {
                    Ok(id) => {
                        self.select_id(&id);
                        self.message = Some(format!("Saved {id}"));
                    }
                    Err(e) => self.message = Some(e.to_string()),
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.commit_field();
                self.load_field(self.field.offset(1));
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.commit_field();
                self.load_field(self.field.offset(-1));
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if !self.field.is_text() => {
                let forward = code != KeyCode::Left;
                self.cycle(forward);
            }
            KeyCode::Char(c) if self.field.is_text() => {
                if self.field != Field::Year || c.is_ascii_digit() || c == '-' {
                    self.buffer.push(c);
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            _ => {}
        }
    }

    fn load_field(&mut self, field: Field) {
        self.field = field;
        self.buffer = self.session.form_mut().map(|f| field.text(f)).unwrap_or_default();
    }

    /// Copy the edit buffer into the form if it changed
    fn commit_field(&mut self) {
        let field = self.field;
        let buffer = self.buffer.clone();
        if let Some(form) = self.session.form_mut() {
            if field.is_text() && field.text(form) != buffer {
                field.store(form, &buffer);
            }
        }
    }

    fn cycle(&mut self, forward: bool) {
        let field = self.field;
        let Some(form) = self.session.form_mut() else {
            return;
        };
        match field {
            Field::Status => {
                let current = form.status.unwrap_or_default();
                let idx = ReadingStatus::ALL.iter().position(|s| *s == current).unwrap_or(0);
                let len = ReadingStatus::ALL.len();
                let next = (if forward { idx + 1 } else { idx + len - 1 }) % len;
                form.status = Some(ReadingStatus::ALL[next]);
            }
            Field::Priority => {
                let current = form.priority.unwrap_or_default();
                // Three priorities: two steps forward is one step back
                form.priority = Some(if forward { current.next() } else { current.next().next() });
            }
            _ => {}
        }
        self.buffer = field.text(form);
    }

    fn nudge(&mut self, direction: char) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let Some(node) = self.session.graph().node(&id) else {
            return;
        };
        let Position { x, y } = node.position;
        let target = match direction {
            'H' => Position::new(x - MOVE_STEP, y),
            'L' => Position::new(x + MOVE_STEP, y),
            'K' => Position::new(x, y - MOVE_STEP),
            _ => Position::new(x, y + MOVE_STEP),
        };
        let result = self.session.move_node(&id, target).map(|()| format!("Moved {id}"));
        self.report(result);
    }

    fn export(&self) -> Result<String> {
        let json = self.session.export_json()?;
        fs::write(&self.export_path, json)
            .with_context(|| format!("Failed to write {}", self.export_path.display()))?;
        info!("Exported papers to {}", self.export_path.display());
        Ok(format!("Exported to {}", self.export_path.display()))
    }

    fn report<E: std::fmt::Display>(&mut self, result: std::result::Result<String, E>) {
        self.message = Some(match result {
            Ok(message) => message,
            Err(e) => {
                warn!("{}", e);
                e.to_string()
            }
        });
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Draw the whole screen
    pub fn render(&self, frame: &mut Frame) {
        let [main, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
        let [list, canvas, details] = Layout::horizontal([
            Constraint::Length(34),
            Constraint::Min(20),
            Constraint::Length(42),
        ])
        .areas(main);

        self.render_list(frame, list);
        self.render_canvas(frame, canvas);
        if matches!(self.session.state(), EditState::Editing { .. }) {
            self.render_form(frame, details);
        } else {
            self.render_details(frame, details);
        }
        self.render_status(frame, status);
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let graph = self.session.graph();
        let items: Vec<ListItem> = self
            .ordered_ids()
            .iter()
            .filter_map(|id| graph.node(id))
            .map(|node| {
                ListItem::new(Line::from(vec![
                    Span::styled("■ ", Style::new().fg(status_color(node.paper.status))),
                    Span::raw(node.paper.title.clone()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::bordered().title(" Papers "))
            .highlight_style(Style::new().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_canvas(&self, frame: &mut Frame, area: Rect) {
        let graph = self.session.graph();
        let config = self.session.layout_config();
        let (w, h) = (config.node_width, config.node_height);
        let selected = self.selected_id();

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (0.0_f64, 0.0_f64, 1.0_f64, 1.0_f64);
        for node in graph.nodes() {
            min_x = min_x.min(node.position.x);
            min_y = min_y.min(node.position.y);
            max_x = max_x.max(node.position.x + w);
            max_y = max_y.max(node.position.y + h);
        }

        // Canvas y grows upwards
        let canvas = Canvas::default()
            .block(Block::bordered().title(" Reading graph "))
            .x_bounds([min_x, max_x])
            .y_bounds([-max_y, -min_y])
            .paint(|ctx| {
                for edge in graph.edges() {
                    let (Some(from), Some(to)) = (graph.node(&edge.source), graph.node(&edge.target)) else {
                        continue;
                    };
                    ctx.draw(&CanvasLine {
                        x1: from.position.x + w / 2.0,
                        y1: -(from.position.y + h / 2.0),
                        x2: to.position.x + w / 2.0,
                        y2: -(to.position.y + h / 2.0),
                        color: Color::DarkGray,
                    });
                }
                ctx.layer();
                for node in graph.nodes() {
                    let color = if selected.as_deref() == Some(node.id.as_str()) {
                        Color::White
                    } else {
                        status_color(node.paper.status)
                    };
                    ctx.draw(&Rectangle {
                        x: node.position.x,
                        y: -(node.position.y + h),
                        width: w,
                        height: h,
                        color,
                    });
                    ctx.print(
                        node.position.x + w * 0.05,
                        -(node.position.y + h / 2.0),
                        node.paper.title.clone(),
                    );
                }
            });
        frame.render_widget(canvas, area);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let graph = self.session.graph();
        let mut lines = Vec::new();
        if let Some(node) = self.selected_id().and_then(|id| graph.node(&id)) {
            let p = &node.paper;
            lines.push(Line::from(p.title.clone()).bold());
            lines.push(Line::from(format!("{} ({})", p.authors, p.year)));
            if let Some(venue) = &p.venue {
                lines.push(Line::from(venue.clone()).italic());
            }
            lines.push(Line::default());
            lines.push(Line::from(vec![
                Span::raw("Status:   "),
                Span::styled(p.status.to_string(), Style::new().fg(status_color(p.status))),
            ]));
            lines.push(Line::from(format!("Priority: {}", p.priority)));
            if let Some(url) = &p.url {
                lines.push(Line::from(format!("URL:      {url}")));
            }
            if let Some(tags) = p.tags.as_ref().filter(|t| !t.is_empty()) {
                lines.push(Line::from(format!("Tags:     {}", tags.join(", "))));
            }
            lines.push(Line::default());
            lines.push(Line::from("Requires:").bold());
            for dep in graph.prerequisites_of(&p.id) {
                let title = graph.node(dep).map_or(dep, |n| n.paper.title.as_str());
                lines.push(Line::from(format!("  {title}")));
            }
            if let Some(description) = &p.description {
                lines.push(Line::default());
                lines.push(Line::from(description.clone()));
            }
        } else {
            lines.push(Line::from("No papers. Press 'a' to add one."));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::bordered().title(" Details "))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let EditState::Editing { paper_id, form } = self.session.state() else {
            return;
        };
        let lines: Vec<Line> = Field::ALL
            .iter()
            .map(|&field| {
                let active = field == self.field;
                let value = if active && field.is_text() {
                    format!("{}_", self.buffer)
                } else {
                    field.text(form)
                };
                let label = Span::styled(
                    format!("{:<9}", field.label()),
                    if active {
                        Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else {
                        Style::new().fg(Color::Gray)
                    },
                );
                Line::from(vec![label, Span::raw(value)])
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(Block::bordered().title(format!(" Edit {paper_id} ")))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(format!(
            " papergraph | {} papers ",
            self.session.graph().node_count()
        ))];
        if self.session.is_dirty() {
            spans.push(Span::styled(" unsaved ", Style::new().fg(Color::Black).bg(Color::Red)));
        }
        if let Some(message) = &self.message {
            spans.push(Span::raw(format!(" {message} ")));
        }
        let help = if matches!(self.session.state(), EditState::Editing { .. }) {
            EDIT_HELP
        } else {
            VIEW_HELP
        };
        spans.push(Span::styled(format!("| {help}"), Style::new().fg(Color::DarkGray)));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.quit {
            terminal.draw(|frame| self.render(frame))?;
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }
}

fn status_color(status: ReadingStatus) -> Color {
    match status {
        ReadingStatus::ToRead => Color::Blue,
        ReadingStatus::Reading => Color::Yellow,
        ReadingStatus::Completed => Color::Green,
        ReadingStatus::Archived => Color::DarkGray,
    }
}

/// Run the viewer until the user quits
pub fn run<S: DocumentStore>(session: &mut Session<S>, export_path: PathBuf) -> Result<()> {
    let mut app = App::new(session, export_path);
    let mut terminal = ratatui::init();
    let result = app.run_loop(&mut terminal);
    ratatui::restore();
    result
}
