use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

const SCROLL_STEP: u16 = 3;
const PAGE_STEP: u16 = 10;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_pending().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work regardless of focus
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_up(PAGE_STEP);
            return;
        }
        KeyCode::PageDown => {
            app.scroll_down(PAGE_STEP);
            return;
        }
        _ => {}
    }

    if app.controller.input().is_focused() {
        handle_input_key(app, key);
    } else if app.controller.send_control().is_focused() {
        handle_button_key(app, key);
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    // Disabled while a request is outstanding
    if !app.controller.input().is_enabled() {
        return;
    }

    if is_newline_chord(&key) {
        app.controller.input_mut().insert_newline();
        return;
    }
    // Plain Enter submits instead of inserting a newline
    if key.code == KeyCode::Enter {
        app.submit();
        return;
    }

    let input = app.controller.input_mut();
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) => input.insert_char(c),
        _ => {}
    }
}

/// Shift+Enter, Alt+Enter, or Ctrl+J.
///
/// Without keyboard enhancement most terminals send Shift+Enter as a bare `\r`, which
/// is indistinguishable from Enter; Alt+Enter and Ctrl+J still arrive intact.
fn is_newline_chord(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => key
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT),
        KeyCode::Char('j') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn handle_button_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Char(' '))
        && app.controller.send_control().is_enabled()
    {
        app.submit();
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if !app.controller.input().is_enabled() {
        return;
    }
    let input = app.controller.input_mut();
    for c in text.chars().filter(|c| *c != '\r') {
        input.insert_char(c);
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_chat = app.chat_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_send = app.send_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(SCROLL_STEP),
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(SCROLL_STEP),
        MouseEventKind::Down(MouseButton::Left)
            if in_send && app.controller.send_control().is_enabled() =>
        {
            app.submit();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use triagem_core::Config;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn app() -> App {
        // Nothing listens on the discard port; these tests never reach the network
        let config = Config::from_endpoint("http://127.0.0.1:9/triagem-completa").unwrap();
        App::new(&config).unwrap()
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c), KeyModifiers::NONE))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_shift_enter_inserts_newline() {
        let mut app = app();
        type_text(&mut app, "febre").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::SHIFT))
            .await
            .unwrap();

        assert_eq!(app.controller.input().text(), "febre\n");
        assert!(app.controller.messages().transcript().is_empty());
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn test_fallback_newline_chords() {
        let mut app = app();
        type_text(&mut app, "a").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::ALT))
            .await
            .unwrap();
        type_text(&mut app, "b").await;
        handle_event(&mut app, key(KeyCode::Char('j'), KeyModifiers::CONTROL))
            .await
            .unwrap();

        assert_eq!(app.controller.input().text(), "a\nb\n");
        assert!(app.controller.messages().transcript().is_empty());
        assert!(!app.controller.is_loading());
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_does_nothing() {
        let mut app = app();
        type_text(&mut app, "   ").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE))
            .await
            .unwrap();

        assert!(app.controller.messages().transcript().is_empty());
        assert!(app.pending.is_none());
        assert!(!app.controller.is_loading());
    }

    #[tokio::test]
    async fn test_enter_submits_and_locks_input() {
        let mut app = app();
        type_text(&mut app, " tosse ").await;
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE))
            .await
            .unwrap();

        let transcript = app.controller.messages().transcript();
        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].plain_text(), "tosse");
        assert!(transcript.is_typing());
        assert!(app.controller.is_loading());
        assert!(app.pending.is_some());

        // Keystrokes are ignored while the request is outstanding
        type_text(&mut app, "x").await;
        assert_eq!(app.controller.input().text(), "");
    }

    #[tokio::test]
    async fn test_tab_moves_focus_to_send_button() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Tab, KeyModifiers::NONE))
            .await
            .unwrap();
        assert!(!app.controller.input().is_focused());
        assert!(app.controller.send_control().is_focused());

        handle_event(&mut app, key(KeyCode::BackTab, KeyModifiers::SHIFT))
            .await
            .unwrap();
        assert!(app.controller.input().is_focused());
    }

    #[tokio::test]
    async fn test_paste_inserts_text() {
        let mut app = app();
        handle_event(&mut app, AppEvent::Paste("dor\r\nno peito".to_string()))
            .await
            .unwrap();
        assert_eq!(app.controller.input().text(), "dor\nno peito");
    }
}
