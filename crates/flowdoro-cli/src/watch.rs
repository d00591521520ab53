//! Interactive mode: a live status line driven by the sampler, with
//! single-key commands.
//!
//! Keys: space start, enter continue into flow, n break, p pause,
//! r resume, x reset, q / esc / ctrl-c quit.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};
use flowdoro_core::{Command, Config, TimerService, TimerView};
use tokio::sync::mpsc;

use crate::commands::timer::{open_engine, status_line};

const RENDER_INTERVAL: Duration = Duration::from_millis(250);
const KEY_POLL: Duration = Duration::from_millis(100);

enum Input {
    Command(Command),
    Quit,
}

pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch(config))
}

async fn watch(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config)?;
    let (service, mut events) = TimerService::new(engine, config.sample_interval());
    service.resume_sampling();

    let _raw = RawMode::enable()?;
    let (key_tx, mut keys) = mpsc::unbounded_channel();
    std::thread::spawn(move || read_keys(key_tx));

    let mut out = io::stdout();
    execute!(
        out,
        Print("space start | enter continue | n break | p pause | r resume | x reset | q quit\r\n")
    )?;

    let mut render = tokio::time::interval(RENDER_INTERVAL);
    loop {
        tokio::select! {
            input = keys.recv() => match input {
                Some(Input::Command(command)) => {
                    if service.dispatch(command).is_none() {
                        tracing::debug!(%command, "command ignored");
                    }
                }
                Some(Input::Quit) | None => break,
            },
            Some(event) = events.recv() => {
                clear_line(&mut out)?;
                execute!(out, Print(format!("{}\r\n", serde_json::to_string(&event)?)))?;
                draw(&mut out, &service.view())?;
            }
            _ = render.tick() => draw(&mut out, &service.view())?,
        }
    }

    service.shutdown();
    execute!(out, Print("\r\n"))?;
    Ok(())
}

fn read_keys(tx: mpsc::UnboundedSender<Input>) {
    while !tx.is_closed() {
        match event::poll(KEY_POLL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "terminal input unavailable");
                let _ = tx.send(Input::Quit);
                return;
            }
        }
        let input = match event::read() {
            Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                map_key(key.code, key.modifiers)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read key");
                None
            }
        };
        if let Some(input) = input {
            if tx.send(input).is_err() {
                return;
            }
        }
    }
}

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Input> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Quit),
        KeyCode::Char(' ') => Some(Input::Command(Command::Start)),
        KeyCode::Enter => Some(Input::Command(Command::ConfirmContinue)),
        KeyCode::Char('n') => Some(Input::Command(Command::DeclineContinue)),
        KeyCode::Char('p') => Some(Input::Command(Command::Pause)),
        KeyCode::Char('r') => Some(Input::Command(Command::Resume)),
        KeyCode::Char('x') => Some(Input::Command(Command::Reset)),
        KeyCode::Char('q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}

fn draw(out: &mut impl Write, view: &TimerView) -> io::Result<()> {
    clear_line(out)?;
    queue!(
        out,
        SetForegroundColor(hex_color(&view.color)),
        Print(status_line(view)),
        ResetColor
    )?;
    out.flush()
}

fn clear_line(out: &mut impl Write) -> io::Result<()> {
    queue!(out, cursor::MoveToColumn(0), terminal::Clear(ClearType::CurrentLine))
}

/// `#rrggbb` to a terminal color; anything else renders uncolored.
fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return Color::Reset;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb { r, g, b },
        _ => Color::Reset,
    }
}

struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_parses_phase_colors() {
        assert_eq!(hex_color("#ff4d4d"), Color::Rgb { r: 255, g: 77, b: 77 });
        assert_eq!(hex_color("#666666"), Color::Rgb { r: 102, g: 102, b: 102 });
        assert_eq!(hex_color("#666"), Color::Reset);
        assert_eq!(hex_color("#zzzzzz"), Color::Reset);
    }

    #[test]
    fn keys_map_to_commands() {
        let none = KeyModifiers::NONE;
        assert!(matches!(
            map_key(KeyCode::Char(' '), none),
            Some(Input::Command(Command::Start))
        ));
        assert!(matches!(
            map_key(KeyCode::Enter, none),
            Some(Input::Command(Command::ConfirmContinue))
        ));
        assert!(matches!(
            map_key(KeyCode::Char('n'), none),
            Some(Input::Command(Command::DeclineContinue))
        ));
        assert!(matches!(
            map_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Input::Quit)
        ));
        assert!(map_key(KeyCode::Char('z'), none).is_none());
    }
}
