mod chat;
mod export;
mod help;
mod state;
pub(crate) mod yaml_view;

use crate::cli::{build_config, Cli};
use crate::conversation::SubmitOutcome;
use crate::orchestrator::{self, ControllerEvent, UiCommand};
use crate::service::{HttpYamlService, YamlService};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use chat::{bottom_scroll, chat_lines, input_view};
use export::{copy_document, save_and_show_path};
use help::draw_help;
use state::{push_wrapped_status_kv, UiState};

const TITLE: &str = "Spheron YAML Generator";
const SUBTITLE: &str = "Describe your deployment requirements in natural language";
// Rows scrolled per PgUp/PgDn.
const YAML_PAGE: i32 = 10;

pub async fn run(args: Cli) -> Result<()> {
    let log_setup = init_logging(&args);

    let cfg = build_config(&args);
    let service: Arc<dyn YamlService> = Arc::new(HttpYamlService::new(&cfg)?);
    tracing::info!(base_url = %cfg.base_url, "starting tui");

    let (event_tx, event_rx) = mpsc::unbounded_channel::<ControllerEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    // UiState moves into that thread; no cross-thread mutation.
    let state = initial_state(cfg.base_url.clone(), log_setup);
    let ui_handle = std::thread::spawn(move || run_threaded(state, event_rx, cmd_tx));

    let res = orchestrator::run_controller(service, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

fn init_logging(args: &Cli) -> Result<()> {
    let log_path = match args.log_file.clone() {
        Some(p) => p,
        None => crate::logging::default_log_path()?,
    };
    crate::logging::init_file(&log_path)
}

/// Logging is optional; a setup failure is reported on the info line instead of aborting.
fn initial_state(base_url: String, log_setup: Result<()>) -> UiState {
    let info = match log_setup {
        Ok(()) => String::new(),
        Err(e) => format!("Logging disabled: {e:#}"),
    };
    UiState {
        base_url,
        info,
        ..Default::default()
    }
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    mut state: UiState,
    mut event_rx: UnboundedReceiver<ControllerEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(100);
    let anim_rate = Duration::from_millis(300);
    let mut last_tick = Instant::now();
    let mut last_anim = Instant::now();

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_anim.elapsed() >= anim_rate {
            state.tick();
            last_anim = Instant::now();
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                let rows = terminal
                    .size()
                    .map(|s| s.height.saturating_sub(12))
                    .unwrap_or(10);
                match handle_key(&mut state, k, rows) {
                    KeyOutcome::Continue => {}
                    KeyOutcome::Command(cmd) => {
                        let _ = cmd_tx.send(cmd);
                    }
                    KeyOutcome::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

#[derive(Debug)]
enum KeyOutcome {
    Continue,
    Command(UiCommand),
    Quit,
}

fn handle_key(state: &mut UiState, k: KeyEvent, yaml_rows: u16) -> KeyOutcome {
    match (k.modifiers, k.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => {
            return KeyOutcome::Quit;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('y')) => copy_document(state),
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => save_and_show_path(state),
        (_, KeyCode::F(1)) => state.show_help = !state.show_help,
        (_, KeyCode::PageUp) => state.scroll_yaml(-YAML_PAGE, yaml_rows),
        (_, KeyCode::PageDown) => state.scroll_yaml(YAML_PAGE, yaml_rows),
        (_, KeyCode::Enter) => {
            return match state.conversation.begin_input() {
                SubmitOutcome::Dispatched(request) => {
                    state.info = format!("Sending ({:?})…", request.mode());
                    KeyOutcome::Command(UiCommand::Dispatch(request))
                }
                SubmitOutcome::Busy => {
                    state.info = "Still processing the previous request…".into();
                    KeyOutcome::Continue
                }
                SubmitOutcome::Ignored => KeyOutcome::Continue,
            };
        }
        (_, KeyCode::Backspace) => state.backspace(),
        (_, KeyCode::Delete) => state.delete(),
        (_, KeyCode::Left) => state.cursor_left(),
        (_, KeyCode::Right) => state.cursor_right(),
        (_, KeyCode::Home) => state.cursor_home(),
        (_, KeyCode::End) => state.cursor_end(),
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => state.insert_char(c),
        _ => {}
    }
    KeyOutcome::Continue
}

fn apply_event(state: &mut UiState, ev: ControllerEvent) {
    match ev {
        ControllerEvent::Resolved(result) => {
            let ok = result.is_ok();
            state.conversation.resolve(result);
            state.clamp_cursor();
            if ok {
                state.yaml_scroll = 0;
                state.info = "YAML updated".into();
            } else {
                state.info = "Request failed".into();
            }
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::Gray))),
    ])
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);
    draw_chat(body[0], f, state);
    draw_yaml(body[1], f, state);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" F1 ", Style::default().fg(Color::Magenta)),
        Span::raw("help  "),
        Span::styled(state.info.clone(), Style::default().fg(Color::Gray)),
    ]));
    f.render_widget(footer, rows[2]);

    if state.show_help {
        let w = area.width.min(52);
        let h = area.height.min(16);
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(w)) / 2,
            y: area.y + (area.height.saturating_sub(h)) / 2,
            width: w,
            height: h,
        };
        draw_help(popup, f);
    }
}

fn draw_chat(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let inner_width = parts[0].width.saturating_sub(2);
    let inner_height = parts[0].height.saturating_sub(2);
    let lines = chat_lines(state.conversation.transcript(), inner_width);
    // Stick to the newest messages.
    let scroll = bottom_scroll(lines.len(), inner_height);
    let chat = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("Chat"));
    f.render_widget(chat, parts[0]);

    let pending = state.conversation.is_pending();
    let title = if pending {
        format!("Processing{}", ".".repeat(state.animation_frame as usize + 1))
    } else {
        "Send".to_string()
    };
    let input_width = parts[1].width.saturating_sub(2);
    let (visible, cursor_col) = input_view(&state.conversation.input, state.cursor, input_width);
    let style = if pending {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let input = if state.conversation.input.is_empty() && !pending {
        Paragraph::new(Span::styled(
            "Describe your deployment requirements...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(Span::styled(visible, style))
    };
    f.render_widget(
        input.block(Block::default().borders(Borders::ALL).title(title)),
        parts[1],
    );
    if !pending && !state.show_help {
        f.set_cursor_position(Position::new(
            parts[1].x + 1 + cursor_col,
            parts[1].y + 1,
        ));
    }
}

fn draw_yaml(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let validation = yaml_view::validation_lines(state.conversation.validation());
    let validation_height = u16::try_from(validation.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(area.height / 3)
        .max(3);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(validation_height),
            Constraint::Length(5),
        ])
        .split(area);

    let yaml = Paragraph::new(yaml_view::numbered_lines(state.conversation.document()))
        .scroll((state.yaml_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Generated YAML Configuration"),
        );
    f.render_widget(yaml, parts[0]);

    let validation = Paragraph::new(validation)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Validation"));
    f.render_widget(validation, parts[1]);

    let mut status: Vec<Line<'static>> = Vec::new();
    push_wrapped_status_kv(&mut status, "Service", &state.base_url, parts[2].width);
    let mode = format!("{:?}", state.conversation.next_mode());
    push_wrapped_status_kv(&mut status, "Next", &mode, parts[2].width);
    if let Some(e) = state.conversation.last_failure() {
        push_wrapped_status_kv(&mut status, "Last error", &e.to_string(), parts[2].width);
    } else if let Some(p) = state.last_saved_path.as_ref() {
        push_wrapped_status_kv(&mut status, "Saved", &p.display().to_string(), parts[2].width);
    }
    let status = Paragraph::new(status).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status, parts[2]);
}
