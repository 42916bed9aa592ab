use std::{cmp, fs, io, path::Path, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, info};
use carrent_core::{
    pricing::{self, ELECTRIC_BATTERY_FEE, LONG_RENTAL_DAYS},
    AppConfig, Category, DeskError, Receipt, RentalDesk, RentalEvent, Vehicle, VehicleId,
};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_NAME_LEN: usize = 32;
const MAX_DAYS_LEN: usize = 6;
const MAX_KEYWORD_LEN: usize = 32;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    fn category_color(&self, category: Category) -> Color {
        match category {
            Category::Sedan => self.primary_fg,
            Category::Suv => self.warning,
            Category::Electric => self.success,
        }
    }
}

fn load_theme(path: Option<&Path>) -> (Theme, String) {
    let mut theme = Theme::default();
    let Some(path) = path else {
        return (theme, "Using default palette".to_string());
    };

    let data = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            return (
                theme,
                format!(
                    "Failed to read {} ({err}); using default palette",
                    path.display()
                ),
            )
        }
    };

    let json: Value = match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(err) => {
            return (
                theme,
                format!(
                    "Failed to parse {} ({err}); using default palette",
                    path.display()
                ),
            )
        }
    };

    let mut applied = 0;
    let slots: [(&str, &mut Color); 7] = [
        ("foreground", &mut theme.primary_fg),
        ("accent", &mut theme.accent),
        ("muted", &mut theme.muted),
        ("selection", &mut theme.selection_bg),
        ("success", &mut theme.success),
        ("warning", &mut theme.warning),
        ("danger", &mut theme.danger),
    ];
    for (key, slot) in slots {
        if let Some(color) = json.get(key).and_then(value_to_color) {
            *slot = color;
            applied += 1;
        }
    }

    let status = format!("Theme {} ({applied} colours)", path.display());
    (theme, status)
}

fn value_to_color(value: &Value) -> Option<Color> {
    match value {
        Value::String(text) => parse_hex_color(text),
        Value::Object(map) => map.get("hex").and_then(value_to_color),
        _ => None,
    }
}

fn parse_hex_color(input: &str) -> Option<Color> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Fleet,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ListFilter {
    All,
    Available,
    Search(String),
}

impl ListFilter {
    fn title(&self) -> String {
        match self {
            ListFilter::All => "All Cars".to_string(),
            ListFilter::Available => "Available Cars".to_string(),
            ListFilter::Search(keyword) => format!("Search: {keyword}"),
        }
    }
}

/// Single-line text entry used by every prompt.
///
/// `cursor` counts characters, not bytes.
#[derive(Debug, Clone, Default)]
struct TextInput {
    input: String,
    cursor: usize,
    limit: usize,
}

impl TextInput {
    fn new(initial: &str, limit: usize) -> Self {
        let input: String = initial.chars().take(limit).collect();
        Self {
            cursor: input.chars().count(),
            input,
            limit,
        }
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.input
            .char_indices()
            .nth(cursor)
            .map_or(self.input.len(), |(index, _)| index)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.char_count() as isize;
        let next = (self.cursor as isize + delta).clamp(0, len);
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    fn insert(&mut self, ch: char) {
        if self.char_count() >= self.limit || ch.is_control() {
            return;
        }
        let index = self.byte_index(self.cursor);
        self.input.insert(index, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let index = self.byte_index(self.cursor);
            self.input.remove(index);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let index = self.byte_index(self.cursor);
            self.input.remove(index);
        }
    }

    fn value(&self) -> &str {
        self.input.trim()
    }

    /// Apply an editing key. Returns `false` for keys the input does not handle.
    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.insert(ch)
            }
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone)]
enum Prompt {
    Name(TextInput),
    Days { vehicle: VehicleId, input: TextInput },
    Search(TextInput),
}

impl Prompt {
    fn input(&self) -> &TextInput {
        match self {
            Prompt::Name(input) | Prompt::Search(input) => input,
            Prompt::Days { input, .. } => input,
        }
    }

    fn input_mut(&mut self) -> &mut TextInput {
        match self {
            Prompt::Name(input) | Prompt::Search(input) => input,
            Prompt::Days { input, .. } => input,
        }
    }
}

/// Outcome of reading the rental length typed by the user.
fn parse_days(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok()
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Interactive rental desk front end.
pub struct CarrentApp {
    desk: RentalDesk,
    state: UiState,
    screen: Screen,
    renter: Option<String>,
    prompt: Option<Prompt>,
    receipt: Option<Receipt>,
    theme: Theme,
}

impl CarrentApp {
    pub fn new(desk: RentalDesk, config: &AppConfig) -> Self {
        let (theme, theme_status) = load_theme(config.theme_file.as_deref());
        let report = desk.replay_report();
        let mut state = UiState::default();
        state.set_status(format!(
            "Restored {} history events ({} skipped) • {theme_status}",
            report.applied, report.skipped
        ));
        let default_name = config.renter.clone().unwrap_or_default();
        let mut app = Self {
            desk,
            state,
            screen: Screen::Fleet,
            renter: None,
            prompt: Some(Prompt::Name(TextInput::new(&default_name, MAX_NAME_LEN))),
            receipt: None,
            theme,
        };
        app.refresh_rows();
        app
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let result = loop {
            if let Err(err) = terminal.draw(|frame| self.draw(frame)) {
                break Err(anyhow::Error::from(err));
            }
            if self.state.should_quit {
                break Ok(());
            }
            match event_rx.recv().await {
                Some(AppEvent::Input(event)) => {
                    if let Err(err) = self.handle_input(event) {
                        error!(?err, "Input handling failed");
                        self.state.set_status(format!("Error: {err}"));
                    }
                }
                Some(AppEvent::Tick) => {}
                None => break Ok(()),
            }
        };

        restore_terminal(&mut terminal)?;
        if let Some(renter) = &self.renter {
            println!("Thank you, {renter}! Goodbye!");
        }
        result
    }

    fn refresh_rows(&mut self) {
        let fleet = self.desk.fleet();
        let rows: Vec<VehicleId> = match &self.state.filter {
            ListFilter::All => fleet.list_all().map(|vehicle| vehicle.id).collect(),
            ListFilter::Available => fleet.list_available().map(|vehicle| vehicle.id).collect(),
            ListFilter::Search(keyword) => fleet.search(keyword),
        };
        self.state.set_rows(rows);
    }

    fn selected_vehicle(&self) -> Option<&Vehicle> {
        self.state
            .current_row()
            .and_then(|id| self.desk.fleet().vehicle(id))
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }

        if self.prompt.is_some() {
            return self.handle_prompt_key(key);
        }
        if self.receipt.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                self.receipt = None;
            }
            return Ok(());
        }
        match self.screen {
            Screen::Fleet => self.handle_fleet_key(key),
            Screen::History => self.handle_history_key(key),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(mut prompt) = self.prompt.take() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => self.cancel_prompt(prompt),
            KeyCode::Enter => self.submit_prompt(prompt)?,
            _ => {
                prompt.input_mut().handle_key(&key);
                self.prompt = Some(prompt);
            }
        }
        Ok(())
    }

    fn cancel_prompt(&mut self, prompt: Prompt) {
        match prompt {
            Prompt::Name(_) if self.renter.is_none() => {
                self.state.should_quit = true;
            }
            Prompt::Name(_) => self.state.set_status("Renter unchanged".to_string()),
            Prompt::Days { .. } => self.state.set_status("Rental cancelled".to_string()),
            Prompt::Search(_) => self.state.set_status("Search cancelled".to_string()),
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) -> Result<()> {
        match prompt {
            Prompt::Name(input) => {
                let name = input.value().to_string();
                if name.is_empty() || name.chars().any(char::is_whitespace) {
                    self.state
                        .set_status("Please enter a single-word name".to_string());
                    self.prompt = Some(Prompt::Name(input));
                    return Ok(());
                }
                info!(renter = %name, "Renter signed in");
                self.state
                    .set_status(format!("Welcome to Car Rental System, {name}!"));
                self.renter = Some(name);
            }
            Prompt::Days { vehicle, input } => {
                let Some(days) = parse_days(input.value()) else {
                    self.state.set_status("Invalid input. Try again.".to_string());
                    self.prompt = Some(Prompt::Days { vehicle, input });
                    return Ok(());
                };
                self.rent(vehicle, days);
            }
            Prompt::Search(input) => {
                let keyword = input.value().to_string();
                if keyword.is_empty() {
                    self.state.filter = ListFilter::All;
                } else {
                    self.state.filter = ListFilter::Search(keyword);
                }
                self.refresh_rows();
                self.state
                    .set_status(format!("{} match(es)", self.state.rows.len()));
            }
        }
        Ok(())
    }

    fn rent(&mut self, vehicle: VehicleId, days: i64) {
        let Some(renter) = self.renter.clone() else {
            return;
        };
        match self.desk.rent(vehicle, &renter, days) {
            Ok(outcome) => {
                self.receipt = Some(Receipt::new(&outcome));
                self.state.set_status(format!(
                    "{} rented for {} days",
                    outcome.label, outcome.quote.days
                ));
                self.refresh_rows();
            }
            Err(err) => self.report_desk_error(err),
        }
    }

    fn give_back(&mut self, vehicle: VehicleId) {
        let Some(renter) = self.renter.clone() else {
            return;
        };
        match self.desk.give_back(vehicle, &renter) {
            Ok(outcome) => {
                self.state.set_status(format!(
                    "Thank you, {}. You have returned the {}.",
                    outcome.renter, outcome.label
                ));
                self.refresh_rows();
            }
            Err(err) => self.report_desk_error(err),
        }
    }

    fn report_desk_error(&mut self, err: DeskError) {
        match &err {
            DeskError::Rental(rule) => {
                info!(%rule, "Request refused");
                self.state.set_status(capitalize(&rule.to_string()));
            }
            DeskError::Storage(cause) => {
                error!(?cause, "History write failed");
                self.state
                    .set_status(format!("Could not save history: {cause}"));
            }
        }
    }

    fn handle_fleet_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('0') => {
                self.state.should_quit = true;
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.state.move_to(0),
            KeyCode::Char('G') | KeyCode::End => self.state.move_to_end(),
            KeyCode::PageDown => self.state.page(1),
            KeyCode::PageUp => self.state.page(-1),
            KeyCode::Char('1') => {
                self.state.filter = ListFilter::All;
                self.refresh_rows();
            }
            KeyCode::Char('2') | KeyCode::Char('a') => {
                self.state.filter = if self.state.filter == ListFilter::Available {
                    ListFilter::All
                } else {
                    ListFilter::Available
                };
                self.refresh_rows();
            }
            KeyCode::Enter | KeyCode::Char('3') | KeyCode::Char('n') => {
                match self.selected_vehicle() {
                    Some(vehicle) if vehicle.is_available() => {
                        let id = vehicle.id;
                        self.prompt = Some(Prompt::Days {
                            vehicle: id,
                            input: TextInput::new("", MAX_DAYS_LEN),
                        });
                    }
                    Some(vehicle) => {
                        let message = format!(
                            "Sorry, this car is already rented by {}",
                            vehicle.renter.as_deref().unwrap_or("someone")
                        );
                        self.state.set_status(message);
                    }
                    None => self.state.set_status("Invalid car selection.".to_string()),
                }
            }
            KeyCode::Char('4') | KeyCode::Char('r') => match self.state.current_row() {
                Some(id) => self.give_back(id),
                None => self.state.set_status("Invalid car selection.".to_string()),
            },
            KeyCode::Char('5') | KeyCode::Char('h') => {
                self.screen = Screen::History;
                self.state.history_cursor = self.desk.fleet().history().len().saturating_sub(1);
            }
            KeyCode::Char('/') => {
                let current = match &self.state.filter {
                    ListFilter::Search(keyword) => keyword.clone(),
                    _ => String::new(),
                };
                self.prompt = Some(Prompt::Search(TextInput::new(&current, MAX_KEYWORD_LEN)));
            }
            KeyCode::Char('y') => {
                let selected = self.state.current_row();
                self.desk.sort_by_year();
                self.refresh_rows();
                if let Some(id) = selected {
                    self.state.select(id);
                }
                self.state.set_status("Sorted by year".to_string());
            }
            KeyCode::Char('u') => {
                let current = self.renter.clone().unwrap_or_default();
                self.prompt = Some(Prompt::Name(TextInput::new(&current, MAX_NAME_LEN)));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_history_key(&mut self, key: KeyEvent) -> Result<()> {
        let total = self.desk.fleet().history().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('q') => {
                self.screen = Screen::Fleet;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.history_cursor =
                    cmp::min(self.state.history_cursor + 1, total.saturating_sub(1));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.history_cursor = self.state.history_cursor.saturating_sub(1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.state.history_cursor = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.state.history_cursor = total.saturating_sub(1);
            }
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(size);

        self.render_header(frame, chunks[0]);
        match self.screen {
            Screen::Fleet => {
                let body = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(chunks[1]);
                self.render_vehicle_list(frame, body[0]);
                self.render_vehicle_info(frame, body[1]);
            }
            Screen::History => self.render_history(frame, chunks[1]),
        }
        self.render_status(frame, chunks[2]);

        if let Some(receipt) = &self.receipt {
            self.render_receipt(frame, receipt);
        }
        if let Some(prompt) = &self.prompt {
            self.render_prompt(frame, prompt);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let fleet = self.desk.fleet();
        let available = fleet.list_available().count();
        let total = fleet.catalog().len();
        let renter = self.renter.as_deref().unwrap_or("-");
        let line = Line::from(vec![
            Span::styled(
                "Car Rental System",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ·  {available}/{total} available  ·  renter: {renter}"),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let header = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        frame.render_widget(header, area);
    }

    fn render_vehicle_list(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        let fleet = self.desk.fleet();
        let items: Vec<ListItem> = self
            .state
            .rows
            .iter()
            .filter_map(|id| fleet.vehicle(*id))
            .map(|vehicle| {
                let index = fleet
                    .catalog()
                    .position_of(vehicle.id)
                    .map(|position| format!("{position:>2}: "))
                    .unwrap_or_default();
                let status = if vehicle.is_available() {
                    Span::styled("Available", Style::default().fg(self.theme.success))
                } else {
                    Span::styled(vehicle.status(), Style::default().fg(self.theme.danger))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(index, Style::default().fg(self.theme.muted)),
                    Span::styled(
                        format!("{} ({}) ", vehicle.label(), vehicle.year),
                        Style::default()
                            .fg(self.theme.category_color(vehicle.category))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("- "),
                    status,
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(self.state.cursor));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.state.filter.title());
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(self.theme.selection_bg))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_vehicle_info(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Car Details");
        let Some(vehicle) = self.selected_vehicle() else {
            let paragraph = Paragraph::new("No cars match")
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        };

        let quote_short = pricing::quote(vehicle.category, 3);
        let quote_long = pricing::quote(vehicle.category, LONG_RENTAL_DAYS);
        let mut lines = vec![
            Line::from(Span::styled(
                vehicle.label(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Year: {}", vehicle.year)),
            Line::from(format!("Category: {}", vehicle.category)),
            Line::from(format!(
                "Daily rate: {}",
                pricing::daily_rate(vehicle.category)
            )),
            Line::from(format!("Status: {}", vehicle.status())),
            Line::from(""),
            Line::from(Span::styled(
                "Sample prices",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{} days: {} ({}% off)",
                quote_short.days,
                quote_short.total,
                quote_short.discount.percent()
            )),
            Line::from(format!(
                "{} days: {} ({}% off)",
                quote_long.days,
                quote_long.total,
                quote_long.discount.percent()
            )),
        ];
        if vehicle.category == Category::Electric {
            lines.push(Line::from(Span::styled(
                format!("Includes {ELECTRIC_BATTERY_FEE} battery fee"),
                Style::default().fg(self.theme.muted),
            )));
        }

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_history(&self, frame: &mut Frame, area: Rect) {
        let history = self.desk.fleet().history();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Rental History ({})", history.len()));
        if history.is_empty() {
            let paragraph = Paragraph::new("No rentals yet.").block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = history
            .iter()
            .map(|event| {
                let color = match event {
                    RentalEvent::Rented { .. } => self.theme.warning,
                    RentalEvent::Returned { .. } => self.theme.success,
                };
                ListItem::new(Line::from(Span::styled(
                    event.to_string(),
                    Style::default().fg(color),
                )))
            })
            .collect();
        let mut list_state = ListState::default();
        list_state.select(Some(cmp::min(self.state.history_cursor, history.len() - 1)));
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = match self.screen {
            Screen::Fleet => {
                "Enter rent · r return · a available · / search · y sort by year · h history · u renter · q quit"
            }
            Screen::History => "j/k scroll · Esc back",
        };
        let paragraph = Paragraph::new(vec![
            Line::from(self.state.status.clone()),
            Line::from(Span::styled(help, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_receipt(&self, frame: &mut Frame, receipt: &Receipt) {
        let body = receipt.lines();
        let height = (body.len() as u16 + 4).min(frame.size().height);
        let area = centered_rect(40, height, frame.size());
        frame.render_widget(Clear, area);

        let mut lines: Vec<Line> = body.into_iter().map(Line::from).collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to close",
            Style::default().fg(self.theme.muted),
        )));
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Receipt")
                    .border_style(Style::default().fg(self.theme.accent)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_prompt(&self, frame: &mut Frame, prompt: &Prompt) {
        let frame_area = frame.size();
        let width = cmp::max(cmp::min(60_u16, frame_area.width.saturating_sub(4)), 24_u16);
        let height = 6_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let (title, instruction) = match prompt {
            Prompt::Name(_) => (
                "Welcome".to_string(),
                "Please enter your name:".to_string(),
            ),
            Prompt::Days { vehicle, .. } => {
                let label = self
                    .desk
                    .fleet()
                    .vehicle(*vehicle)
                    .map(Vehicle::label)
                    .unwrap_or_default();
                (format!("Rent {label}"), "Enter number of days:".to_string())
            }
            Prompt::Search(_) => (
                "Search".to_string(),
                "Brand or model (empty shows all):".to_string(),
            ),
        };
        let input = prompt.input();
        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(input.input.clone()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" confirm  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);

        let paragraph = Paragraph::new(vec![Line::from(instruction), input_line, helper])
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        let cursor_x =
            (area.x + 3 + input.cursor as u16).min(area.x + area.width.saturating_sub(2));
        let cursor_y = area.y + 2;
        frame.set_cursor(cursor_x, cursor_y);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    rows: Vec<VehicleId>,
    cursor: usize,
    list_height: usize,
    filter: ListFilter,
    history_cursor: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            cursor: 0,
            list_height: 1,
            filter: ListFilter::All,
            history_cursor: 0,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_rows(&mut self, rows: Vec<VehicleId>) {
        let selected = self.current_row();
        self.rows = rows;
        match selected {
            Some(id) if self.select(id) => {}
            _ => self.clamp_cursor(),
        }
    }

    fn current_row(&self) -> Option<VehicleId> {
        self.rows.get(self.cursor).copied()
    }

    fn select(&mut self, id: VehicleId) -> bool {
        match self.rows.iter().position(|row| *row == id) {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        let max = self.rows.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }

    fn move_to(&mut self, index: usize) {
        self.cursor = index;
        self.clamp_cursor();
    }

    fn move_to_end(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    fn page(&mut self, direction: isize) {
        let step = self.list_height.max(1) as isize;
        self.move_cursor(direction * step);
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.rows.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len() - 1;
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrent_core::HistoryStore;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_in(dir: &Path) -> Result<CarrentApp> {
        let desk = RentalDesk::open(HistoryStore::new(dir.join("history.txt")))?;
        let config = AppConfig {
            data_dir: dir.to_path_buf(),
            history_file: "history.txt".into(),
            log_dir: dir.join("logs"),
            theme_file: None,
            renter: Some("alice".to_string()),
        };
        Ok(CarrentApp::new(desk, &config))
    }

    fn press(app: &mut CarrentApp, code: KeyCode) -> Result<()> {
        app.handle_input(Event::Key(key(code)))
    }

    #[test]
    fn text_input_edits_at_cursor() {
        let mut input = TextInput::new("ali", 8);
        input.handle_key(&key(KeyCode::Char('e')));
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "lie");
        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "li");
        assert!(!input.handle_key(&key(KeyCode::Tab)));
    }

    #[test]
    fn text_input_respects_limit() {
        let mut input = TextInput::new("12345", 5);
        input.insert('6');
        assert_eq!(input.value(), "12345");
    }

    #[test]
    fn text_input_edits_accented_names() {
        let mut input = TextInput::new("José", MAX_NAME_LEN);
        input.backspace();
        assert_eq!(input.value(), "Jos");
        input.insert('é');
        input.move_home();
        input.move_cursor(3);
        input.delete();
        assert_eq!(input.value(), "Jos");
        input.move_cursor(-1);
        input.insert('ü');
        assert_eq!(input.value(), "Joüs");
        assert_eq!(input.cursor, 3);
    }

    #[test]
    fn parse_days_accepts_signed_integers() {
        assert_eq!(parse_days(" 7 "), Some(7));
        assert_eq!(parse_days("-1"), Some(-1));
        assert_eq!(parse_days("seven"), None);
    }

    #[test]
    fn hex_colours_parse() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_hex_color("fff"), None);
    }

    #[test]
    fn rent_and_return_through_keys() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app_in(dir.path())?;

        press(&mut app, KeyCode::Enter)?;
        assert_eq!(app.renter.as_deref(), Some("alice"));

        let first = app.state.current_row().expect("first row");
        press(&mut app, KeyCode::Enter)?;
        press(&mut app, KeyCode::Char('3'))?;
        press(&mut app, KeyCode::Enter)?;
        assert!(app.receipt.is_some());
        assert!(!app
            .desk
            .fleet()
            .vehicle(first)
            .map(Vehicle::is_available)
            .unwrap_or(true));

        press(&mut app, KeyCode::Enter)?;
        assert!(app.receipt.is_none());
        press(&mut app, KeyCode::Char('r'))?;
        assert!(app
            .desk
            .fleet()
            .vehicle(first)
            .map(Vehicle::is_available)
            .unwrap_or(false));
        assert_eq!(app.desk.fleet().history().len(), 2);
        Ok(())
    }

    #[test]
    fn invalid_days_keep_prompt_open() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app_in(dir.path())?;
        press(&mut app, KeyCode::Enter)?;

        press(&mut app, KeyCode::Enter)?;
        press(&mut app, KeyCode::Char('x'))?;
        press(&mut app, KeyCode::Enter)?;
        assert!(matches!(app.prompt, Some(Prompt::Days { .. })));

        press(&mut app, KeyCode::Esc)?;
        assert!(app.prompt.is_none());
        assert!(app.desk.fleet().history().is_empty());
        Ok(())
    }

    #[test]
    fn search_filters_rows() -> Result<()> {
        let dir = tempdir()?;
        let mut app = app_in(dir.path())?;
        press(&mut app, KeyCode::Enter)?;

        press(&mut app, KeyCode::Char('/'))?;
        for ch in "tesla".chars() {
            press(&mut app, KeyCode::Char(ch))?;
        }
        press(&mut app, KeyCode::Enter)?;
        assert_eq!(app.state.rows.len(), 2);
        assert_eq!(app.state.filter, ListFilter::Search("tesla".to_string()));
        Ok(())
    }
}
