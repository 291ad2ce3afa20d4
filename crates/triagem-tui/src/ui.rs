use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use triagem_core::render::{
    self, ADDRESS_LABEL, CLASSIFICATION_LABEL, PHONE_LABEL, SPECIALTY_LABEL,
};
use triagem_core::{Message, MessageContent, Sender};

use crate::app::App;

/// Rows the input box may grow to, borders excluded
const MAX_INPUT_ROWS: u16 = 6;
const SEND_BUTTON_WIDTH: u16 = 12;

fn user_label_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn assistant_label_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

/// Lines for one rendered triage result
fn markup_lines(markup: &render::Markup) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for block in markup.blocks() {
        match block {
            render::Block::Classification(value) => lines.push(Line::from(vec![
                Span::styled(CLASSIFICATION_LABEL, Style::default().bold()),
                Span::raw(" "),
                Span::raw(value.clone()),
            ])),
            render::Block::Observation(text) => {
                if !text.is_empty() {
                    lines.push(Line::from(Span::styled(text.clone(), Style::default().italic())));
                }
            }
            render::Block::Heading(text) => {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    text.clone(),
                    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )));
            }
            render::Block::List(items) => {
                lines.extend(items.iter().map(|item| Line::from(format!("• {}", item))));
            }
            render::Block::ProviderCard(card) => {
                let label = Style::default().fg(Color::DarkGray);
                lines.push(Line::from(Span::styled(
                    card.name.clone(),
                    Style::default().fg(Color::Green).bold(),
                )));
                lines.push(Line::from(vec![
                    Span::styled(format!("  {} ", SPECIALTY_LABEL), label),
                    Span::raw(card.specialty.clone()),
                ]));
                lines.push(Line::from(vec![
                    Span::styled(format!("  {} ", ADDRESS_LABEL), label),
                    Span::raw(card.address.clone()),
                ]));
                lines.push(Line::from(vec![
                    Span::styled(format!("  {} ", PHONE_LABEL), label),
                    Span::raw(card.phone_or_missing().to_string()),
                ]));
            }
        }
    }
    lines
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let mut lines = match message.sender {
        Sender::User => vec![Line::from(Span::styled("Você:", user_label_style()))],
        Sender::Assistant => vec![Line::from(Span::styled("TrIAgem:", assistant_label_style()))],
    };

    match &message.content {
        MessageContent::Text(text) => {
            lines.extend(text.lines().map(|line| Line::from(line.to_string())));
        }
        MessageContent::Markup(markup) => lines.extend(markup_lines(markup)),
    }
    lines.push(Line::default());
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let input_rows = (app.controller.input().line_count() as u16).clamp(1, MAX_INPUT_ROWS);

    // Main layout: header, chat, input row, footer
    let [header_area, chat_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    let [input_area, send_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(SEND_BUTTON_WIDTH)])
            .areas(input_row);

    // Store areas for mouse hit-testing
    app.chat_area = Some(chat_area);
    app.send_area = Some(send_area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_send_button(app, frame, send_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" TrIAgem ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint_label.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Triagem ");

    let log = app.controller.messages();
    let transcript = log.transcript();

    let lines: Vec<Line> = if transcript.is_empty() && !transcript.is_typing() {
        vec![Line::from(Span::styled(
            "Descreva seus sintomas para receber uma orientação de triagem.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let mut lines: Vec<Line> = transcript.messages().iter().flat_map(message_lines).collect();

        if transcript.is_typing() {
            lines.push(Line::from(Span::styled("TrIAgem:", assistant_label_style())));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Digitando{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    };

    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    // Keep the newest entry in view unless the user scrolled away from the bottom.
    // Rows are counted by the same word wrapper that renders them.
    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);
    let rows = u16::try_from(chat.line_count(inner_width)).unwrap_or(u16::MAX);
    let max_scroll = rows.saturating_sub(inner_height);

    let log = app.controller.messages_mut();
    if log.follow {
        log.scroll = max_scroll;
    } else {
        log.scroll = log.scroll.min(max_scroll);
        if log.scroll == max_scroll {
            log.follow = true;
        }
    }

    let chat = chat.block(chat_block).scroll((log.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input = app.controller.input();

    let border_color = if !input.is_enabled() {
        Color::DarkGray
    } else if input.is_focused() {
        Color::Yellow
    } else {
        Color::Gray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Sintomas ");

    let inner_height = area.height.saturating_sub(2) as usize;
    let (cursor_line, cursor_col) = input.cursor_line_col();

    // Keep the cursor row visible when the text is taller than the box
    let row_offset = (cursor_line + 1).saturating_sub(inner_height);
    let inner_width = area.width.saturating_sub(2) as usize;
    let col_offset = if inner_width > 0 && cursor_col >= inner_width {
        cursor_col - inner_width + 1
    } else {
        0
    };

    let paragraph = if input.text().is_empty() {
        Paragraph::new(Span::styled(
            input.placeholder().to_string(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let style = if input.is_enabled() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Paragraph::new(input.text().to_string())
            .style(style)
            .scroll((row_offset as u16, col_offset as u16))
    };

    frame.render_widget(paragraph.block(input_block), area);

    if input.is_enabled() && input.is_focused() {
        frame.set_cursor_position((
            area.x + 1 + (cursor_col - col_offset) as u16,
            area.y + 1 + (cursor_line - row_offset) as u16,
        ));
    }
}

fn render_send_button(app: &App, frame: &mut Frame, area: Rect) {
    let button = app.controller.send_control();

    let style = if !button.is_enabled() {
        Style::default().fg(Color::DarkGray)
    } else if button.is_focused() {
        Style::default().bg(Color::Yellow).fg(Color::Black).bold()
    } else {
        Style::default().fg(Color::Yellow).bold()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if button.is_focused() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let label = Paragraph::new(Line::from(Span::styled(" Enviar ", style)).centered()).block(block);
    frame.render_widget(label, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" enviar ", label_style),
        Span::styled(" Shift/Alt+Enter, Ctrl+J ", key_style),
        Span::styled(" nova linha ", label_style),
        Span::styled(" Tab ", key_style),
        Span::styled(" foco ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" rolar ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" sair ", label_style),
    ];

    if app.controller.is_loading() {
        hints.push(Span::styled(
            " analisando... ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
