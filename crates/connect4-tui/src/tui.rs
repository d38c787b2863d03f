//! Ratatui TUI frontend for the Connect-Four client.
//!
//! Pure UI module: terminal lifecycle, rendering, and input → intent mapping.
//! All game state lives in `connect4_client` and all networking in
//! [`crate::app`]. This module has no networking dependencies.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::io::{self, Stdout};

use connect4_client::state::{ClientState, GameEvent, LogCategory};
use connect4_core::board::{COLS, EMPTY};
use connect4_core::protocol::RoomSummary;

// ---------------------------------------------------------------------------
// Intents — result of processing user input
// ---------------------------------------------------------------------------

/// The result of processing user input in the lobby.
#[derive(Debug, PartialEq, Eq)]
pub enum LobbyIntent {
    None,
    Quit,
    /// Re-fetch the room listing now.
    Refresh,
    /// Join the named room.
    Join(String),
}

/// The result of processing user input inside a game room.
#[derive(Debug, PartialEq, Eq)]
pub enum GameIntent {
    None,
    /// Close the application.
    Quit,
    /// Leave the room and return to the lobby.
    Leave,
    /// Drop a piece in the given column.
    Drop(usize),
    /// Ask the server for a new game.
    Reset,
    /// Send a chat line.
    Chat(String),
    /// Local feedback message for the event log.
    Feedback(String, LogCategory),
}

// ---------------------------------------------------------------------------
// TUI-only state
// ---------------------------------------------------------------------------

/// Which panel receives keystrokes inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Board,
    Chat,
}

/// UI-layer state that lives alongside (but separate from) the game state.
struct TuiState {
    /// Highlighted row in the lobby room list.
    selected_room: usize,
    /// Column the drop cursor sits over.
    cursor_col: usize,
    focus: Focus,
    /// Chat input buffer
    chat_input: String,
    /// Chat input cursor position
    chat_cursor: usize,
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            selected_room: 0,
            cursor_col: COLS / 2,
            focus: Focus::Board,
            chat_input: String::new(),
            chat_cursor: 0,
        }
    }
}

impl TuiState {
    fn move_cursor_left(&mut self) {
        let moved = self.chat_cursor.saturating_sub(1);
        self.chat_cursor = self.clamp_cursor(moved);
    }

    fn move_cursor_right(&mut self) {
        let moved = self.chat_cursor.saturating_add(1);
        self.chat_cursor = self.clamp_cursor(moved);
    }

    fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.chat_input.insert(index, new_char);
        self.move_cursor_right();
    }

    fn byte_index(&self) -> usize {
        self.chat_input
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.chat_cursor)
            .unwrap_or(self.chat_input.len())
    }

    fn delete_char(&mut self) {
        if self.chat_cursor != 0 {
            let before = self.chat_input.chars().take(self.chat_cursor - 1);
            let after = self.chat_input.chars().skip(self.chat_cursor);
            self.chat_input = before.chain(after).collect();
            self.move_cursor_left();
        }
    }

    fn clamp_cursor(&self, new_cursor_pos: usize) -> usize {
        new_cursor_pos.clamp(0, self.chat_input.chars().count())
    }

    fn clear_chat_input(&mut self) {
        self.chat_input.clear();
        self.chat_cursor = 0;
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Occupancy label for a lobby row, e.g. `room_1 (1/2)`.
fn room_label(room: &RoomSummary) -> String {
    format!("{} ({}/2)", room.room_id, room.players)
}

/// Full rooms cannot be joined from the lobby.
fn is_joinable(room: &RoomSummary) -> bool {
    !room.is_full
}

fn select_prev(selected: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (selected + len - 1) % len
    }
}

fn select_next(selected: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (selected + 1) % len }
}

fn clamp_selection(selected: usize, len: usize) -> usize {
    if len == 0 { 0 } else { selected.min(len - 1) }
}

fn prev_col(col: usize) -> usize {
    (col + COLS - 1) % COLS
}

fn next_col(col: usize) -> usize {
    (col + 1) % COLS
}

/// `'1'..='7'` selects a column directly.
fn digit_to_col(c: char) -> Option<usize> {
    c.to_digit(10)
        .filter(|d| (1..=COLS as u32).contains(d))
        .map(|d| d as usize - 1)
}

fn piece_glyph(cell: u8) -> &'static str {
    if cell == EMPTY { " · " } else { " ● " }
}

fn piece_color(cell: u8) -> Color {
    match cell {
        1 => Color::Red,
        2 => Color::Yellow,
        _ => Color::DarkGray,
    }
}

/// Format a structured [`GameEvent`] into a human-readable log line.
fn format_event(event: &GameEvent) -> String {
    match event {
        GameEvent::Chat { player, message } => format!("Player {player}: {message}"),
        GameEvent::ServerError { message } => format!("Error: {message}"),
        GameEvent::Disconnected => "Server disconnected".to_string(),
        GameEvent::Text { text, .. } => text.clone(),
    }
}

// ---------------------------------------------------------------------------
// Public API — Tui struct
// ---------------------------------------------------------------------------

/// Owns the ratatui terminal and all UI-layer state.
///
/// The orchestrator ([`crate::app`]) drives this struct: call the render
/// method for the current screen each frame and the matching poll method to
/// translate keyboard events into intents.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: TuiState,
}

impl Tui {
    /// Set up the terminal (raw mode, alternate screen) and return a ready `Tui`.
    pub fn setup() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            state: TuiState::default(),
        })
    }

    /// Restore the terminal to its original state.
    pub fn teardown(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Reset room-scoped UI state when entering a game.
    pub fn enter_room(&mut self) {
        self.state.cursor_col = COLS / 2;
        self.state.focus = Focus::Board;
        self.state.clear_chat_input();
    }

    /// Draw the lobby screen.
    pub fn render_lobby(&mut self, rooms: &[RoomSummary], notice: Option<&str>) -> io::Result<()> {
        self.state.selected_room = clamp_selection(self.state.selected_room, rooms.len());
        let state = &self.state;
        self.terminal.draw(|f| lobby_ui(f, rooms, notice, state))?;
        Ok(())
    }

    /// Draw the in-game screen.
    pub fn render_game(&mut self, gs: &ClientState, room_id: &str) -> io::Result<()> {
        let state = &self.state;
        self.terminal.draw(|f| game_ui(f, gs, room_id, state))?;
        Ok(())
    }

    /// Poll for a lobby keyboard event and translate it into a
    /// [`LobbyIntent`]. Never blocks.
    pub fn poll_lobby_input(&mut self, rooms: &[RoomSummary]) -> io::Result<LobbyIntent> {
        let Some(key) = poll_key()? else {
            return Ok(LobbyIntent::None);
        };
        Ok(handle_lobby_key(&mut self.state, key, rooms))
    }

    /// Poll for an in-game keyboard event and translate it into a
    /// [`GameIntent`]. Never blocks.
    pub fn poll_game_input(&mut self, gs: &ClientState) -> io::Result<GameIntent> {
        let Some(key) = poll_key()? else {
            return Ok(GameIntent::None);
        };
        Ok(handle_game_key(&mut self.state, key, gs))
    }
}

// ---------------------------------------------------------------------------
// Input → intent mapping
// ---------------------------------------------------------------------------

fn handle_lobby_key(tui: &mut TuiState, key: KeyEvent, rooms: &[RoomSummary]) -> LobbyIntent {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => LobbyIntent::Quit,
        KeyCode::Char('r') => LobbyIntent::Refresh,
        KeyCode::Up | KeyCode::Char('k') => {
            tui.selected_room = select_prev(tui.selected_room, rooms.len());
            LobbyIntent::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            tui.selected_room = select_next(tui.selected_room, rooms.len());
            LobbyIntent::None
        }
        KeyCode::Enter => match rooms.get(tui.selected_room) {
            // Full rooms stay listed but cannot be entered.
            Some(room) if is_joinable(room) => LobbyIntent::Join(room.room_id.clone()),
            _ => LobbyIntent::None,
        },
        _ => LobbyIntent::None,
    }
}

fn handle_game_key(tui: &mut TuiState, key: KeyEvent, gs: &ClientState) -> GameIntent {
    match tui.focus {
        Focus::Chat => match key.code {
            KeyCode::Esc | KeyCode::Tab => {
                tui.focus = Focus::Board;
                GameIntent::None
            }
            KeyCode::Enter => {
                let text = tui.chat_input.trim().to_string();
                tui.clear_chat_input();
                if text.is_empty() {
                    GameIntent::None
                } else {
                    GameIntent::Chat(text)
                }
            }
            KeyCode::Char(c) => {
                tui.enter_char(c);
                GameIntent::None
            }
            KeyCode::Backspace => {
                tui.delete_char();
                GameIntent::None
            }
            KeyCode::Left => {
                tui.move_cursor_left();
                GameIntent::None
            }
            KeyCode::Right => {
                tui.move_cursor_right();
                GameIntent::None
            }
            _ => GameIntent::None,
        },
        Focus::Board => match key.code {
            KeyCode::Esc => GameIntent::Leave,
            KeyCode::Char('q') => GameIntent::Quit,
            KeyCode::Tab => {
                tui.focus = Focus::Chat;
                GameIntent::None
            }
            KeyCode::Char('r') => GameIntent::Reset,
            KeyCode::Char(' ') => drop_intent(gs, tui.cursor_col),
            KeyCode::Char(c) => match digit_to_col(c) {
                Some(col) => drop_intent(gs, col),
                None => GameIntent::None,
            },
            KeyCode::Left => {
                tui.cursor_col = prev_col(tui.cursor_col);
                GameIntent::None
            }
            KeyCode::Right => {
                tui.cursor_col = next_col(tui.cursor_col);
                GameIntent::None
            }
            KeyCode::Enter => drop_intent(gs, tui.cursor_col),
            _ => GameIntent::None,
        },
    }
}

/// Translate a move request, short-circuiting when the session is over.
fn drop_intent(gs: &ClientState, col: usize) -> GameIntent {
    if !gs.connected {
        return GameIntent::Feedback(
            "Not connected".to_string(),
            LogCategory::Error,
        );
    }
    GameIntent::Drop(col)
}

/// Poll for one key press without blocking.
fn poll_key() -> io::Result<Option<KeyEvent>> {
    if !event::poll(std::time::Duration::from_millis(0))? {
        return Ok(None);
    }
    let Event::Key(key) = event::read()? else {
        return Ok(None);
    };
    if key.kind != KeyEventKind::Press {
        return Ok(None);
    }
    Ok(Some(key))
}

// ---------------------------------------------------------------------------
// Lobby rendering
// ---------------------------------------------------------------------------

fn lobby_ui(frame: &mut Frame, rooms: &[RoomSummary], notice: Option<&str>, tui: &TuiState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Room list
            Constraint::Length(1), // Notice
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    let title = Paragraph::new("Connect Four")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, layout[0]);

    let items: Vec<ListItem> = if rooms.is_empty() {
        vec![ListItem::new(Span::styled(
            "No rooms available",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        rooms
            .iter()
            .enumerate()
            .map(|(i, room)| {
                let selected = i == tui.selected_room;
                let marker = if selected { "> " } else { "  " };
                let style = if !is_joinable(room) {
                    Style::default().fg(Color::DarkGray)
                } else if selected {
                    Style::default().fg(Color::Cyan).bold()
                } else {
                    Style::default().fg(Color::White)
                };
                let mut label = room_label(room);
                if !is_joinable(room) {
                    label.push_str("  full");
                }
                ListItem::new(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(label, style),
                ]))
            })
            .collect()
    };

    let room_list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Rooms ")
            .title_style(Style::default().fg(Color::Blue).bold()),
    );
    frame.render_widget(room_list, layout[1]);

    if let Some(notice) = notice {
        let line = Paragraph::new(notice).style(Style::default().fg(Color::Red));
        frame.render_widget(line, layout[2]);
    }

    let hints = Paragraph::new(Line::from(vec![
        Span::styled("↑/↓", Style::default().fg(Color::Cyan).bold()),
        Span::raw(": Select | "),
        Span::styled("Enter", Style::default().fg(Color::Cyan).bold()),
        Span::raw(": Join | "),
        Span::styled("r", Style::default().fg(Color::Cyan).bold()),
        Span::raw(": Refresh | "),
        Span::styled("q", Style::default().fg(Color::Cyan).bold()),
        Span::raw(": Quit"),
    ]));
    frame.render_widget(hints, layout[3]);
}

// ---------------------------------------------------------------------------
// Game rendering
// ---------------------------------------------------------------------------

fn game_ui(frame: &mut Frame, gs: &ClientState, room_id: &str, tui: &TuiState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(13), // Board + status
            Constraint::Min(4),     // Chat log
            Constraint::Length(3),  // Chat input
            Constraint::Length(1),  // Status bar
        ])
        .split(frame.area());

    render_board(frame, gs, room_id, tui, layout[0]);
    render_log(frame, gs, layout[1]);
    render_chat_input(frame, tui, layout[2]);
    render_status_bar(frame, gs, tui, layout[3]);
}

fn render_board(frame: &mut Frame, gs: &ClientState, room_id: &str, tui: &TuiState, area: Rect) {
    let mut lines = vec![];

    // Drop cursor above the grid.
    let mut cursor_spans = vec![];
    let show_cursor = gs.connected && gs.game_active && tui.focus == Focus::Board;
    for col in 0..COLS {
        let glyph = if show_cursor && col == tui.cursor_col {
            " ▼ "
        } else {
            "   "
        };
        cursor_spans.push(Span::styled(glyph, Style::default().fg(Color::Green).bold()));
    }
    lines.push(Line::from(cursor_spans));

    for (r, row) in gs.shadow.iter().enumerate() {
        let mut spans = vec![];
        for (c, &cell) in row.iter().enumerate() {
            let mut style = Style::default().fg(piece_color(cell));
            if gs.last_placed == Some((r, c)) {
                style = style.bg(Color::DarkGray).bold();
            }
            spans.push(Span::styled(piece_glyph(cell), style));
        }
        lines.push(Line::from(spans));
    }

    let numbers: String = (1..=COLS).map(|n| format!(" {n} ")).collect();
    lines.push(Line::from(Span::styled(
        numbers,
        Style::default().fg(Color::Gray),
    )));

    lines.push(Line::from(""));

    let status_style = if gs.status_line() == "Your turn" {
        Style::default().fg(Color::Green).bold()
    } else if !gs.connected {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default().fg(Color::White)
    };
    lines.push(Line::from(Span::styled(gs.status_line(), status_style)));

    if let Some(identity) = gs.identity_line() {
        let color = match gs.player_num {
            Some(1) => Color::Red,
            Some(2) => Color::Yellow,
            _ => Color::Gray,
        };
        lines.push(Line::from(Span::styled(
            identity,
            Style::default().fg(color),
        )));
    }

    let board = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(format!(" {room_id} "))
            .title_style(Style::default().fg(Color::Magenta).bold()),
    );
    frame.render_widget(board, area);
}

fn render_log(frame: &mut Frame, gs: &ClientState, area: Rect) {
    let messages: Vec<ListItem> = gs
        .events
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .rev()
        .map(|ev| {
            let style = match ev.category() {
                LogCategory::System => Style::default().fg(Color::Yellow),
                LogCategory::Chat => Style::default().fg(Color::Cyan),
                LogCategory::Error => Style::default().fg(Color::Red),
            };
            ListItem::new(Span::styled(format_event(ev), style))
        })
        .collect();

    let log = List::new(messages).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Chat ")
            .title_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(log, area);
}

fn render_chat_input(frame: &mut Frame, tui: &TuiState, area: Rect) {
    let focused = tui.focus == Focus::Chat;
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(tui.chat_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Message "),
    );
    frame.render_widget(input, area);

    if focused {
        #[allow(clippy::cast_possible_truncation)]
        frame.set_cursor_position((area.x + tui.chat_cursor as u16 + 1, area.y + 1));
    }
}

fn render_status_bar(frame: &mut Frame, gs: &ClientState, tui: &TuiState, area: Rect) {
    let (dot_color, dot_text) = if gs.connected {
        (Color::Green, "● Connected")
    } else {
        (Color::Red, "● Disconnected")
    };

    let mut spans = vec![
        Span::styled(dot_text, Style::default().fg(dot_color)),
        Span::raw(" | "),
    ];
    if tui.focus == Focus::Chat {
        spans.extend([
            Span::styled("Enter", Style::default().fg(Color::Cyan).bold()),
            Span::raw(": Send | "),
            Span::styled("Tab", Style::default().fg(Color::Cyan).bold()),
            Span::raw(": Board"),
        ]);
    } else {
        spans.extend([
            Span::styled("1-7/Enter", Style::default().fg(Color::Cyan).bold()),
            Span::raw(": Drop | "),
            Span::styled("r", Style::default().fg(Color::Cyan).bold()),
            Span::raw(": New game | "),
            Span::styled("Tab", Style::default().fg(Color::Cyan).bold()),
            Span::raw(": Chat | "),
            Span::styled("Esc", Style::default().fg(Color::Cyan).bold()),
            Span::raw(": Lobby | "),
            Span::styled("q", Style::default().fg(Color::Cyan).bold()),
            Span::raw(": Quit"),
        ]);
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
