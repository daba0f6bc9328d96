//! Feeds a running session from standard input.
//!
//! Each line is either a key sequence from the shortcut table (`Ctrl+M`,
//! `F11`, ...) or one of a few commands that stand in for what a real
//! engine or window would report.

use std::io::BufRead;
use std::thread;

use colored::Colorize;
use liquid_application::EventSender;
use liquid_core::app::Cookie;
use liquid_core::navigation::NavigationKind;
use liquid_core::session::{
    NavigationAttempt, SessionEvent, SurfaceEvent, WindowAction, WindowEvent, shortcut,
};
use strum::IntoEnumIterator;
use tracing::debug;
use url::Url;

#[derive(Debug, PartialEq)]
enum Input {
    Events(Vec<SessionEvent>),
    Help,
    Unknown(String),
    Empty,
}

fn parse_url(raw: &str) -> Option<Url> {
    Url::parse(raw.trim()).ok()
}

fn navigation(url: Url, kind: NavigationKind, is_main_frame: bool) -> SessionEvent {
    SessionEvent::Surface(SurfaceEvent::NavigationRequested(NavigationAttempt {
        url,
        kind,
        is_main_frame,
        user_forced_external: false,
    }))
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if let Some(action) = shortcut::action_for(line) {
        return Input::Events(vec![SessionEvent::Action(action)]);
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let command = command.to_ascii_lowercase();
    let events = match command.as_str() {
        "help" | "?" => return Input::Help,
        "close" => vec![SessionEvent::CloseRequested],
        "move" => vec![SessionEvent::Window(WindowEvent::Moved)],
        "resize" => vec![SessionEvent::Window(WindowEvent::Resized)],
        "wheel" => match rest.trim() {
            "up" => vec![SessionEvent::Window(WindowEvent::ZoomWheel { delta: 120 })],
            "down" => vec![SessionEvent::Window(WindowEvent::ZoomWheel { delta: -120 })],
            _ => return Input::Unknown(line.to_string()),
        },
        "fail" => vec![
            SessionEvent::Surface(SurfaceEvent::LoadStarted),
            SessionEvent::Surface(SurfaceEvent::LoadFinished { ok: false }),
        ],
        "title" => vec![SessionEvent::Surface(SurfaceEvent::TitleChanged(
            rest.trim().to_string(),
        ))],
        "click" | "frame" | "submit" => {
            let Some(url) = parse_url(rest) else {
                return Input::Unknown(line.to_string());
            };
            match command.as_str() {
                "click" => vec![navigation(url, NavigationKind::LinkClicked, true)],
                "frame" => vec![navigation(url, NavigationKind::LinkClicked, false)],
                _ => vec![navigation(url, NavigationKind::FormSubmitted, true)],
            }
        }
        "cookie" => match Cookie::from_wire(rest.trim()) {
            Ok(cookie) => vec![SessionEvent::Surface(SurfaceEvent::CookieAdded(cookie))],
            Err(_) => return Input::Unknown(line.to_string()),
        },
        _ => return Input::Unknown(line.to_string()),
    };
    Input::Events(events)
}

fn print_help() {
    println!("{}", "Shortcuts:".bold());
    for action in WindowAction::iter() {
        println!(
            "  {:<28} {}",
            shortcut::sequences_for(action).join(", "),
            action.to_string().bright_black()
        );
    }
    println!("{}", "Emulated events:".bold());
    for (usage, what) in [
        ("click <url>", "main-frame link click"),
        ("frame <url>", "sub-frame link click"),
        ("submit <url>", "form submission"),
        ("cookie <set-cookie>", "page stored a cookie"),
        ("title <text>", "page title changed"),
        ("fail", "page failed to load"),
        ("move | resize", "window moved or resized"),
        ("wheel up|down", "Ctrl+wheel zoom"),
        ("close", "window close button"),
    ] {
        println!("  {:<28} {}", usage, what.bright_black());
    }
}

/// Starts the reader thread. End of input closes the session.
pub fn spawn(events: EventSender) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match parse_line(&line) {
                Input::Events(batch) => {
                    for event in batch {
                        debug!("[Driver] {:?}", event);
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                }
                Input::Help => print_help(),
                Input::Unknown(text) => {
                    println!("{} {} (try 'help')", "unknown input:".yellow(), text)
                }
                Input::Empty => {}
            }
        }
        let _ = events.send(SessionEvent::CloseRequested);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcuts_become_actions() {
        assert_eq!(
            parse_line("ctrl+shift+r"),
            Input::Events(vec![SessionEvent::Action(WindowAction::HardReload)])
        );
        assert_eq!(
            parse_line("  Ctrl+Q "),
            Input::Events(vec![SessionEvent::Action(WindowAction::Quit)])
        );
    }

    #[test]
    fn test_navigation_commands() {
        let url = Url::parse("https://b.example/x").unwrap();
        assert_eq!(
            parse_line("click https://b.example/x"),
            Input::Events(vec![navigation(url.clone(), NavigationKind::LinkClicked, true)])
        );
        assert_eq!(
            parse_line("submit https://b.example/x"),
            Input::Events(vec![navigation(url.clone(), NavigationKind::FormSubmitted, true)])
        );
        assert_eq!(
            parse_line("frame https://b.example/x"),
            Input::Events(vec![navigation(url, NavigationKind::LinkClicked, false)])
        );
        assert!(matches!(parse_line("click not a url"), Input::Unknown(_)));
    }

    #[test]
    fn test_cookie_command() {
        let Input::Events(events) = parse_line("cookie sid=abc; Domain=a.example; Path=/") else {
            panic!("expected events");
        };
        let [SessionEvent::Surface(SurfaceEvent::CookieAdded(cookie))] = events.as_slice() else {
            panic!("expected one cookie event");
        };
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.value, "abc");
    }

    #[test]
    fn test_misc_inputs() {
        assert_eq!(parse_line(""), Input::Empty);
        assert_eq!(parse_line("help"), Input::Help);
        assert!(matches!(parse_line("wheel sideways"), Input::Unknown(_)));
        assert_eq!(
            parse_line("wheel up"),
            Input::Events(vec![SessionEvent::Window(WindowEvent::ZoomWheel { delta: 120 })])
        );
        assert!(matches!(parse_line("dance"), Input::Unknown(_)));
    }
}
