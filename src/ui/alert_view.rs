//! Terminal rendering and key handling for an [`Alert`].

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph},
    Frame,
};

use crate::alert::{Alert, FocusTarget, InteractionMode, Platform, Pose};

use super::text::{truncate, wrap_text};

/// Widest the alert box gets, borders included.
const MAX_WIDTH: u16 = 56;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    None,
    /// Activate the button at this index.
    Activate(usize),
    /// Treat as a click on the backdrop.
    Backdrop,
    /// Raise a dismiss request from inside the alert.
    DismissRequest,
}

/// View-side state: keyboard focus and the current animation pose.
#[derive(Debug, Clone, Default)]
pub struct AlertView {
    /// Index into [`Alert::focus_order`].
    pub focus: Option<usize>,
    pub pose: Option<Pose>,
}

impl AlertView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_first(&mut self, alert: &Alert) {
        self.focus = if alert.focus_order().is_empty() {
            None
        } else {
            Some(0)
        };
    }

    pub fn focused(&self, alert: &Alert) -> Option<FocusTarget> {
        self.focus
            .and_then(|index| alert.focus_order().get(index).copied())
    }

    fn move_focus(&mut self, alert: &Alert, forward: bool) {
        let len = alert.focus_order().len();
        if len == 0 {
            self.focus = None;
            return;
        }
        self.focus = Some(match self.focus {
            None => 0,
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
        });
    }

    /// Handle a key press against `alert`.
    pub fn handle_key(
        &mut self,
        alert: &mut Alert,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> ViewAction {
        match code {
            KeyCode::Esc => return ViewAction::Backdrop,
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
                return ViewAction::DismissRequest;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(alert, true);
                return ViewAction::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(alert, false);
                return ViewAction::None;
            }
            _ => {}
        }

        let activates = matches!(code, KeyCode::Enter | KeyCode::Char(' '));
        match self.focused(alert) {
            Some(FocusTarget::Button(index)) if activates => ViewAction::Activate(index),
            Some(FocusTarget::Input(index)) => {
                match alert.mode() {
                    InteractionMode::Radio if activates => {
                        alert.radio_click(index);
                    }
                    InteractionMode::Checkbox if activates => {
                        alert.checkbox_click(index);
                    }
                    InteractionMode::Text => self.edit_text(alert, index, code),
                    _ => {}
                }
                ViewAction::None
            }
            _ => ViewAction::None,
        }
    }

    fn edit_text(&mut self, alert: &mut Alert, index: usize, code: KeyCode) {
        let Some(input) = alert.inputs().get(index) else {
            return;
        };
        let mut value = input.value.clone();
        match code {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Enter => {
                self.move_focus(alert, true);
                return;
            }
            _ => return,
        }
        alert.set_text_value(index, value);
    }
}

/// Build the alert's content lines for a given inner width.
pub fn alert_lines(alert: &Alert, view: &AlertView, width: usize) -> Vec<Line<'static>> {
    let options = alert.options();
    let focused = view.focused(alert);
    let mut lines = Vec::new();

    if let Some(title) = &options.title {
        lines.push(Line::from(Span::styled(
            truncate(title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(sub_title) = &options.sub_title {
        lines.push(Line::from(Span::styled(
            truncate(sub_title, width),
            Style::default().fg(Color::Gray),
        )));
    }
    if let Some(message) = &options.message {
        lines.push(Line::from(""));
        lines.extend(wrap_text(message, width).into_iter().map(Line::from));
    }

    if !alert.inputs().is_empty() {
        lines.push(Line::from(""));
    }
    for (index, input) in alert.inputs().iter().enumerate() {
        let label = input.label.clone().unwrap_or_else(|| input.value.clone());
        let text = match alert.mode() {
            InteractionMode::Radio => {
                format!("{} {}", if input.checked { "(•)" } else { "( )" }, label)
            }
            InteractionMode::Checkbox => {
                format!("{} {}", if input.checked { "[x]" } else { "[ ]" }, label)
            }
            InteractionMode::Text | InteractionMode::None => {
                if input.value.is_empty() {
                    format!("> {}", input.placeholder)
                } else {
                    format!("> {}", input.value)
                }
            }
        };

        let mut style = Style::default();
        if input.disabled {
            style = style.fg(Color::DarkGray);
        } else if alert.mode() == InteractionMode::Text && input.value.is_empty() {
            style = style.fg(Color::Gray);
        }
        if focused == Some(FocusTarget::Input(index)) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        lines.push(Line::from(Span::styled(truncate(&text, width), style)));
    }

    if !alert.buttons().is_empty() {
        lines.push(Line::from(""));
        let spans: Vec<Span<'static>> = alert
            .buttons()
            .iter()
            .enumerate()
            .map(|(index, button)| {
                let style = if focused == Some(FocusTarget::Button(index)) {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                Span::styled(format!("[ {} ]", button.text), style)
            })
            .collect();

        if alert.button_group_vertical() {
            lines.extend(spans.into_iter().map(Line::from));
        } else {
            let mut row = Vec::new();
            for (i, span) in spans.into_iter().enumerate() {
                if i > 0 {
                    row.push(Span::raw("  "));
                }
                row.push(span);
            }
            lines.push(Line::from(row));
        }
    }

    lines
}

/// Size of the alert box in `area`, scaled by the animation pose.
pub fn alert_area(area: Rect, content_height: u16, pose: Pose) -> Rect {
    let base_width = MAX_WIDTH.min(area.width.saturating_sub(4)).max(1);
    let base_height = content_height.saturating_add(2).min(area.height);

    let scale = pose.scale.max(0.0);
    let width = ((base_width as f32 * scale).round() as u16).clamp(1, area.width.max(1));
    let height = ((base_height as f32 * scale).round() as u16).clamp(1, area.height.max(1));

    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Render the backdrop and the alert.
pub fn render_alert(f: &mut Frame, alert: &Alert, view: &AlertView) {
    let area = f.size();
    let options = alert.options();
    let pose = view.pose.unwrap_or_default();

    // Backdrop
    let backdrop_bg = if options.translucent {
        Color::Rgb(30, 30, 40)
    } else {
        Color::Rgb(0, 0, 0)
    };
    f.render_widget(Block::default().style(Style::default().bg(backdrop_bg)), area);

    let inner_width = MAX_WIDTH.min(area.width.saturating_sub(4)).saturating_sub(4) as usize;
    let lines = alert_lines(alert, view, inner_width.max(1));
    let content_height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let alert_rect = alert_area(area, content_height, pose);

    let faded = pose.opacity < 0.5;
    let border_color = if faded { Color::DarkGray } else { Color::Cyan };
    let border_type = match options.mode {
        Platform::Ios => BorderType::Rounded,
        Platform::Md => BorderType::Plain,
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color))
        .padding(Padding::horizontal(1));
    if !options.translucent {
        block = block.style(Style::default().bg(Color::Black));
    }

    let text_style = if faded {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    f.render_widget(Clear, alert_rect);
    f.render_widget(Paragraph::new(lines).style(text_style).block(block), alert_rect);
}
