use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::ExecutableCommand;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::client::DatasetClient;
use crate::domain::{FacetKind, FacetSpec};
use crate::download::{DownloadOutcome, DownloadSink, DownloadState, Rejected};
use crate::filter::TagIndex;
use crate::listeners::Listeners;
use crate::panel::{Click, PanelScope};
use crate::session::{Explorer, SessionEvent, cell_text};
use crate::suggest::SuggestState;

const EVENTS_MAX: usize = 6;
const LOGS_MAX: usize = 200;
const FRAME_INTERVAL: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Explore,
    Logs,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Facets,
    Panel,
    Input,
    Grid,
}

/// Recent activity, shared with the download sink.
#[derive(Default)]
struct Activity {
    events: RefCell<VecDeque<String>>,
    logs: RefCell<VecDeque<String>>,
}

impl Activity {
    fn record(&self, message: String) {
        push_event(&mut self.events.borrow_mut(), message.clone());
        push_log(
            &mut self.logs.borrow_mut(),
            format!("[{}] {message}", timestamp()),
        );
    }
}

impl DownloadSink for Activity {
    fn transition(&self, state: DownloadState) {
        self.record(format!("download {}", download_label(state)));
    }
}

pub struct Tui<C: DatasetClient + 'static> {
    explorer: Explorer<C>,
    activity: Activity,
    clicks: Listeners<Click>,
    panel: Option<PanelScope>,
    view: View,
    focus: Focus,
    facet_cursor: usize,
    option_cursor: usize,
    column_cursor: usize,
    column_input: String,
    log_scroll: u16,
}

impl<C: DatasetClient + 'static> Tui<C> {
    pub fn new(explorer: Explorer<C>) -> Self {
        let activity = Activity::default();
        activity.record(format!("exploring {}", explorer.dataset().title()));
        Self {
            explorer,
            activity,
            clicks: Listeners::new(),
            panel: None,
            view: View::Explore,
            focus: Focus::Facets,
            facet_cursor: 0,
            option_cursor: 0,
            column_cursor: 0,
            column_input: String::new(),
            log_scroll: 0,
        }
    }

    pub fn run(&mut self) -> miette::Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;
        stdout.execute(EnableMouseCapture).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(DisableMouseCapture).into_diagnostic()?;
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> miette::Result<()> {
        let mut tick = 0usize;
        loop {
            for event in self.explorer.tick(Instant::now(), &self.activity) {
                self.activity.record(describe(&event));
            }

            terminal
                .draw(|frame| draw_ui(frame, self, tick))
                .into_diagnostic()?;

            if event::poll(self.poll_timeout()).into_diagnostic()? {
                match event::read().into_diagnostic()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            tick = tick.wrapping_add(1);
        }
        Ok(())
    }

    /// Wake up no later than the next debounce deadline.
    fn poll_timeout(&self) -> Duration {
        match self.explorer.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(FRAME_INTERVAL),
            None => FRAME_INTERVAL,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match key.code {
            KeyCode::F(1) => {
                self.view = View::Help;
                return false;
            }
            KeyCode::F(2) => {
                self.view = View::Explore;
                return false;
            }
            KeyCode::F(4) => {
                self.view = View::Logs;
                return false;
            }
            KeyCode::PageUp => {
                self.scroll_logs(-5);
                return false;
            }
            KeyCode::PageDown => {
                self.scroll_logs(5);
                return false;
            }
            _ => {}
        }
        if self.view != View::Explore {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                self.view = View::Explore;
            }
            return false;
        }

        match self.focus {
            Focus::Facets => return self.handle_facets_key(key),
            Focus::Panel => self.handle_panel_key(key),
            Focus::Input => self.handle_input_key(key),
            Focus::Grid => self.handle_grid_key(key),
        }
        false
    }

    fn handle_facets_key(&mut self, key: KeyEvent) -> bool {
        let facet_count = self.explorer.dataset().facets().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.facet_cursor = self.facet_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.facet_cursor + 1 < facet_count {
                    self.facet_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Right => self.open_facet(),
            KeyCode::Tab => self.focus = Focus::Grid,
            KeyCode::Char('d') => self.download(),
            KeyCode::Char('c') => {
                self.explorer.clear_filters();
                self.column_input.clear();
                self.activity.record("filters cleared".to_string());
            }
            _ => {}
        }
        false
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        let Some(FacetKind::Checkbox(options)) = self.current_facet().map(|facet| facet.kind)
        else {
            self.close_panel();
            return;
        };
        match key.code {
            KeyCode::Up => self.option_cursor = self.option_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.option_cursor + 1 < options.len() {
                    self.option_cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let (Some(facet), Some(option)) =
                    (self.current_facet(), options.get(self.option_cursor))
                {
                    let checked = !self.explorer.store().is_selected(facet.key, option);
                    self.explorer.toggle(facet.key, option, checked);
                }
            }
            KeyCode::Esc | KeyCode::Left => self.close_panel(),
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        let Some(facet) = self.current_facet().map(|facet| facet.key) else {
            self.focus = Focus::Facets;
            return;
        };
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => {
                self.explorer.set_text(facet, "", now);
                self.focus = Focus::Facets;
            }
            KeyCode::Up => self.explorer.highlight_previous(facet),
            KeyCode::Down => self.explorer.highlight_next(facet),
            KeyCode::Enter => {
                if let Some(tag) = self.explorer.accept(facet) {
                    self.activity.record(format!("{facet}: added {}", tag.text));
                }
            }
            KeyCode::Backspace => self.explorer.backspace(facet, now),
            KeyCode::Delete => self.explorer.remove_tag(facet, TagIndex::At(0)),
            KeyCode::Char(ch) => self.explorer.type_char(facet, ch, now),
            _ => {}
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) {
        let columns = self.explorer.dataset().columns();
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Facets,
            KeyCode::Left => {
                self.column_cursor = self.column_cursor.saturating_sub(1);
                self.load_column_input();
            }
            KeyCode::Right => {
                if self.column_cursor + 1 < columns.len() {
                    self.column_cursor += 1;
                }
                self.load_column_input();
            }
            KeyCode::Backspace => {
                self.column_input.pop();
                self.apply_column_input();
            }
            KeyCode::Char(ch) => {
                self.column_input.push(ch);
                self.apply_column_input();
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(_)) {
            return;
        }
        self.clicks.emit(&Click {
            column: mouse.column,
            row: mouse.row,
        });
        if self.panel.as_ref().is_some_and(PanelScope::is_closed) {
            self.close_panel();
        }
    }

    fn open_facet(&mut self) {
        let Some(facet) = self.current_facet() else {
            return;
        };
        match facet.kind {
            FacetKind::Checkbox(_) => {
                // Real area is set on the next draw.
                self.panel = Some(PanelScope::open(&self.clicks, facet.key, Rect::default()));
                self.option_cursor = 0;
                self.focus = Focus::Panel;
            }
            FacetKind::FreeText => self.focus = Focus::Input,
        }
    }

    fn close_panel(&mut self) {
        self.panel = None;
        self.focus = Focus::Facets;
    }

    fn download(&mut self) {
        match self.explorer.request_download(Local::now(), &self.activity) {
            Ok(()) => {}
            Err(Rejected::NoFilters) => self
                .activity
                .record("select at least one filter to download".to_string()),
            Err(Rejected::InFlight) => self
                .activity
                .record("a download is already in progress".to_string()),
        }
    }

    fn current_facet(&self) -> Option<&'static FacetSpec> {
        self.explorer.dataset().facets().get(self.facet_cursor)
    }

    fn current_column(&self) -> Option<&'static str> {
        self.explorer
            .dataset()
            .columns()
            .get(self.column_cursor)
            .map(|column| column.key)
    }

    fn load_column_input(&mut self) {
        self.column_input = self
            .current_column()
            .and_then(|column| self.explorer.column_filter(column))
            .unwrap_or_default()
            .to_string();
    }

    fn apply_column_input(&mut self) {
        if let Some(column) = self.current_column() {
            self.explorer.local_filter(column, &self.column_input);
        }
    }

    fn scroll_logs(&mut self, delta: i16) {
        let max = self.activity.logs.borrow().len();
        let max_scroll = max.saturating_sub(1) as i16;
        let next = (self.log_scroll as i16 + delta).clamp(0, max_scroll);
        self.log_scroll = next as u16;
    }
}

fn draw_ui<C: DatasetClient + 'static>(frame: &mut ratatui::Frame, tui: &Tui<C>, tick: usize) {
    match tui.view {
        View::Explore => draw_explore(frame, tui, tick),
        View::Logs => draw_logs(frame, tui, tick),
        View::Help => draw_help(frame),
    }
}

fn draw_explore<C: DatasetClient + 'static>(frame: &mut ratatui::Frame, tui: &Tui<C>, tick: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(tui, tick), chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    if let Some(panel) = &tui.panel {
        panel.set_area(main[0]);
    }
    frame.render_widget(draw_facets_panel(tui), main[0]);
    draw_preview(frame, tui, main[1]);
    draw_status_line(frame, tui, chunks[2]);
}

fn draw_logs<C: DatasetClient + 'static>(frame: &mut ratatui::Frame, tui: &Tui<C>, tick: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    frame.render_widget(draw_header(tui, tick), chunks[0]);
    frame.render_widget(draw_logs_view(tui), chunks[1]);
    draw_status_line(frame, tui, chunks[2]);
}

fn draw_help(frame: &mut ratatui::Frame) {
    let block = Block::default().borders(Borders::ALL).title("Help");
    let lines = vec![
        Line::from("F1 Help  F2 Explore  F4 Logs  PgUp/PgDown scroll logs"),
        Line::from("Facets: Up/Down select, Enter open, d download, c clear, Tab grid, q quit"),
        Line::from("Checkbox panel: Up/Down move, Space toggle, Esc or click outside to close"),
        Line::from("Free text: type for suggestions, Up/Down highlight, Enter add tag"),
        Line::from("          Backspace on empty input removes the last tag"),
        Line::from("Grid: Left/Right choose column, type to filter rows, Esc back"),
    ];
    let view = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(view, frame.area());
}

fn draw_header<C: DatasetClient + 'static>(tui: &Tui<C>, tick: usize) -> Paragraph<'static> {
    let hb = if tick % 2 == 0 { "*" } else { " " };
    let dataset = tui.explorer.dataset();
    let state = tui.explorer.download_state();
    let state_color = match state {
        DownloadState::Idle => Color::Green,
        DownloadState::Requesting | DownloadState::Waiting => Color::Yellow,
    };
    let header_line = Line::from(vec![
        Span::styled(
            "LABORGRID",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(env!("CARGO_PKG_VERSION"), Style::default().fg(Color::Gray)),
        Span::raw("   Dataset: "),
        Span::styled(dataset.title(), Style::default().fg(Color::Cyan)),
        Span::raw("   Download: "),
        Span::styled(download_label(state), Style::default().fg(state_color)),
        Span::raw("   "),
        Span::styled(hb, Style::default().fg(Color::Green)),
    ]);
    let query = tui.explorer.query_string();
    let query_line = Line::from(vec![
        Span::styled("Query: ", Style::default().fg(Color::Gray)),
        Span::styled(
            if query.is_empty() {
                "(none)".to_string()
            } else {
                query
            },
            Style::default().fg(Color::Gray),
        ),
    ]);
    Paragraph::new(vec![header_line, query_line])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::BOTTOM))
}

fn draw_facets_panel<C: DatasetClient + 'static>(tui: &Tui<C>) -> Paragraph<'static> {
    let explorer = &tui.explorer;
    let store = explorer.store();
    let mut lines = vec![Line::from(Span::styled(
        "FILTERS",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];

    for (index, facet) in explorer.dataset().facets().iter().enumerate() {
        let selected = index == tui.facet_cursor;
        let marker = if selected { "> " } else { "  " };
        let label_style = if selected && tui.focus != Focus::Grid {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let count = store.values(facet.key).len();
        let count_label = if count > 0 {
            format!(" ({count})")
        } else {
            String::new()
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(facet.label, label_style),
            Span::styled(count_label, Style::default().fg(Color::Gray)),
        ]));

        match facet.kind {
            FacetKind::Checkbox(options) => {
                let open = tui
                    .panel
                    .as_ref()
                    .is_some_and(|panel| panel.facet() == facet.key);
                if !open {
                    continue;
                }
                for (option_index, option) in options.iter().enumerate() {
                    let check = if store.is_selected(facet.key, option) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    let style = if option_index == tui.option_cursor {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::from(Span::styled(
                        format!("    {check} {option}"),
                        style,
                    )));
                }
            }
            FacetKind::FreeText => {
                let tags = store.tags(facet.key);
                if !tags.is_empty() {
                    let chips: Vec<_> = tags.iter().map(|tag| format!("[{}]", tag.text)).collect();
                    lines.push(Line::from(Span::styled(
                        format!("    {}", chips.join(" ")),
                        Style::default().fg(Color::Green),
                    )));
                }
                if selected && tui.focus == Focus::Input {
                    lines.extend(suggestion_lines(tui, facet.key));
                }
            }
        }
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::RIGHT))
        .wrap(Wrap { trim: false })
}

fn suggestion_lines<C: DatasetClient + 'static>(tui: &Tui<C>, facet: &str) -> Vec<Line<'static>> {
    let Some(engine) = tui.explorer.engine(facet) else {
        return Vec::new();
    };
    let mut lines = vec![Line::from(vec![
        Span::styled("    > ", Style::default().fg(Color::Cyan)),
        Span::raw(engine.text().to_string()),
        Span::styled("_", Style::default().fg(Color::Gray)),
    ])];
    match engine.state() {
        SuggestState::Pending => lines.push(Line::from(Span::styled(
            "      searching...",
            Style::default().fg(Color::Gray),
        ))),
        SuggestState::Failed(message) => lines.push(Line::from(Span::styled(
            format!("      {message}"),
            Style::default().fg(Color::Red),
        ))),
        _ => {}
    }
    for (index, suggestion) in engine.suggestions().iter().enumerate() {
        let style = if engine.highlighted() == Some(index) {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("      {suggestion}"), style)));
    }
    lines
}

fn draw_preview<C: DatasetClient + 'static>(frame: &mut ratatui::Frame, tui: &Tui<C>, area: Rect) {
    let explorer = &tui.explorer;
    let columns = explorer.dataset().columns();
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let filter_line = match tui.focus {
        Focus::Grid => Line::from(vec![
            Span::styled("Filter ", Style::default().fg(Color::Gray)),
            Span::styled(
                columns
                    .get(tui.column_cursor)
                    .map(|column| column.name)
                    .unwrap_or_default(),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!(": {}_", tui.column_input)),
        ]),
        _ => {
            let rows = explorer.visible_rows().len();
            let total = explorer.page().rows.len();
            let more = if explorer.page().has_more {
                " (more on server)"
            } else {
                ""
            };
            let loading = if explorer.preview_loading() {
                "  loading..."
            } else {
                ""
            };
            Line::from(Span::styled(
                format!("Preview: {rows}/{total} rows{more}{loading}"),
                Style::default().fg(Color::Gray),
            ))
        }
    };
    frame.render_widget(Paragraph::new(filter_line), sections[0]);

    let header = Row::new(columns.iter().enumerate().map(|(index, column)| {
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if tui.focus == Focus::Grid && index == tui.column_cursor {
            style = style.fg(Color::Cyan);
        }
        if explorer.column_filter(column.key).is_some() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(column.name).style(style)
    }));
    let rows = explorer.visible_rows().into_iter().map(|row| {
        Row::new(columns.iter().map(|column| {
            Cell::from(row.get(column.key).map(cell_text).unwrap_or_default())
        }))
    });
    let widths = vec![Constraint::Fill(1); columns.len()];
    let table = Table::new(rows, widths).header(header).column_spacing(1);
    frame.render_widget(table, sections[1]);
}

fn draw_status_line<C: DatasetClient + 'static>(
    frame: &mut ratatui::Frame,
    tui: &Tui<C>,
    area: Rect,
) {
    let explorer = &tui.explorer;
    let mut lines = Vec::new();

    if let Some(notice) = explorer.notice() {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }
    match explorer.last_download() {
        Some(DownloadOutcome::Failed { message }) => lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))),
        Some(DownloadOutcome::Saved(saved)) => lines.push(Line::from(Span::styled(
            format!("Saved {}", saved.path),
            Style::default().fg(Color::Green),
        ))),
        None => {}
    }
    if let Some(event) = tui.activity.events.borrow().back() {
        lines.push(Line::from(vec![
            Span::styled("- ", Style::default().fg(Color::DarkGray)),
            Span::styled(event.clone(), Style::default().fg(Color::DarkGray)),
        ]));
    }

    let download_hint = if explorer.can_download() {
        Span::styled("d download", Style::default().fg(Color::Green))
    } else {
        Span::styled("d download", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(vec![
        download_hint,
        Span::styled(
            "   c clear   Tab grid   F1 help   F4 logs   q quit",
            Style::default().fg(Color::Gray),
        ),
    ]));

    let para = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    frame.render_widget(para, area);
}

fn draw_logs_view<C: DatasetClient + 'static>(tui: &Tui<C>) -> Paragraph<'static> {
    let logs = tui.activity.logs.borrow();
    let total = logs.len();
    let visible = 20usize;
    let start = total.saturating_sub(tui.log_scroll as usize + visible);
    let mut lines = Vec::with_capacity(visible + 1);
    lines.push(Line::from(Span::styled(
        "LOGS (scrollable)",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    for line in logs.iter().skip(start).take(visible) {
        lines.push(Line::from(line.clone()));
    }
    Paragraph::new(lines)
        .block(Block::default())
        .wrap(Wrap { trim: true })
}

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::PreviewLoaded { rows, has_more } => {
            let more = if *has_more { "+" } else { "" };
            format!("preview: {rows}{more} rows")
        }
        SessionEvent::PreviewFailed(message) => message.clone(),
        SessionEvent::SuggestionsLoaded { facet, count } => {
            format!("{facet}: {count} suggestions")
        }
        SessionEvent::SuggestionsFailed { facet, message } => format!("{facet}: {message}"),
        SessionEvent::SuggestionsExpired { facet } => format!("{facet}: suggestions timed out"),
        SessionEvent::Download(DownloadOutcome::Saved(saved)) => {
            format!("saved {} ({} bytes)", saved.file_name, saved.bytes)
        }
        SessionEvent::Download(DownloadOutcome::Failed { message }) => message.clone(),
    }
}

fn download_label(state: DownloadState) -> &'static str {
    match state {
        DownloadState::Idle => "idle",
        DownloadState::Requesting => "requesting",
        DownloadState::Waiting => "waiting",
    }
}

fn push_event(buffer: &mut VecDeque<String>, item: String) {
    buffer.push_back(item);
    while buffer.len() > EVENTS_MAX {
        buffer.pop_front();
    }
}

fn push_log(buffer: &mut VecDeque<String>, item: String) {
    buffer.push_back(item);
    while buffer.len() > LOGS_MAX {
        buffer.pop_front();
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
