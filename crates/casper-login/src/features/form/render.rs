//! Form view.
//!
//! Rendering functions for the login and recovery forms and the toast.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::state::{Focus, FormMode, FormState, InputField, SubmitControl, Toast};

const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];
const TOAST_HEIGHT: u16 = 3;

/// Renders the form (and the toast, when open) into `area`.
pub fn render_form(frame: &mut Frame, form: &FormState, area: Rect, spinner_frame: usize) {
    let title = match form.mode {
        FormMode::Login => "Sign in",
        FormMode::Recover => "Recover password",
    };
    let border_color = if form.is_locked() {
        Color::DarkGray
    } else {
        Color::Cyan
    };

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);

    let inner = Rect::new(
        area.x + 2,
        area.y + 1,
        area.width.saturating_sub(4),
        area.height.saturating_sub(2),
    );
    let para = Paragraph::new(form_lines(form, spinner_frame));
    frame.render_widget(para, inner);

    if form.toast.open {
        render_toast(frame, &form.toast, toast_area(&form.toast, area));
    }
}

/// Bottom rows of the anchor area (the form when no anchor is set).
pub fn toast_area(toast: &Toast, form_area: Rect) -> Rect {
    let anchor = toast.fit_into.unwrap_or(form_area);
    let height = TOAST_HEIGHT.min(anchor.height);
    Rect::new(
        anchor.x,
        anchor.y + anchor.height.saturating_sub(height),
        anchor.width,
        height,
    )
}

fn render_toast(frame: &mut Frame, toast: &Toast, area: Rect) {
    let color = if toast.success {
        Color::Green
    } else {
        Color::Red
    };
    frame.render_widget(Clear, area);
    let para = Paragraph::new(Line::from(Span::styled(
        toast.text.clone(),
        Style::default().fg(color),
    )))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(para, area);
}

fn focus_style(form: &FormState, focus: Focus, disabled: bool) -> Style {
    if disabled {
        Style::default().fg(Color::DarkGray)
    } else if form.focus == Some(focus) {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

/// Field text; passwords are masked and the saved-credential placeholder is blank.
fn display_value(field: &InputField, masked: bool) -> String {
    if masked {
        field
            .value
            .chars()
            .map(|c| if c == '\u{a0}' { ' ' } else { '•' })
            .collect()
    } else {
        field.value.clone()
    }
}

fn field_lines(
    form: &FormState,
    label: &str,
    field: &InputField,
    focus: Focus,
    masked: bool,
) -> Vec<Line<'static>> {
    let style = focus_style(form, focus, field.disabled);
    let value_style = if field.selected {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{label:<10}"), style),
        Span::styled(display_value(field, masked), value_style),
    ])];
    if field.invalid {
        lines.push(Line::from(Span::styled(
            format!("{:<10}{}", "", field.error_message),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn button_line(
    form: &FormState,
    label: &str,
    control: &SubmitControl,
    spinner_frame: usize,
) -> Line<'static> {
    let style = focus_style(form, Focus::Submit, control.disabled);
    let mut spans = vec![Span::styled(format!("[ {label} ]"), style)];
    if control.submitting {
        let frame = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!(" {frame}"),
            Style::default().fg(Color::Yellow),
        ));
    } else if control.progress == 100 {
        spans.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
    }
    Line::from(spans)
}

/// Lines of the form body for the current mode.
pub fn form_lines(form: &FormState, spinner_frame: usize) -> Vec<Line<'static>> {
    let mut lines = field_lines(form, "Email", &form.email, Focus::Email, false);

    if form.password.visible {
        lines.extend(field_lines(
            form,
            "Password",
            &form.password,
            Focus::Password,
            true,
        ));
    }

    if form.remember.visible {
        let mark = if form.remember.checked { "x" } else { " " };
        lines.push(Line::from(Span::styled(
            format!("[{mark}] Remember me"),
            focus_style(form, Focus::Remember, form.remember.disabled),
        )));
    }

    lines.push(Line::from(""));
    if form.sign_in.visible {
        lines.push(button_line(form, "Sign in", &form.sign_in, spinner_frame));
    }
    if form.recover.visible {
        lines.push(button_line(
            form,
            "Send instructions",
            &form.recover,
            spinner_frame,
        ));
    }

    lines.push(Line::from(""));
    let link_style = focus_style(form, Focus::ModeLink, form.user_actions.disabled);
    if form.user_actions.forgot_visible {
        lines.push(Line::from(Span::styled(
            "Forgot your password?",
            link_style.add_modifier(Modifier::UNDERLINED),
        )));
    }
    if form.user_actions.login_visible {
        lines.push(Line::from(Span::styled(
            "Back to sign in",
            link_style.add_modifier(Modifier::UNDERLINED),
        )));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_login_mode_lines() {
        let mut form = FormState::new(true);
        form.email.set_value("ana@example.com");
        form.password.set_value("secret");

        let rendered = text(&form_lines(&form, 0));

        assert!(rendered.iter().any(|l| l.contains("ana@example.com")));
        assert!(rendered.iter().any(|l| l.contains("••••••")));
        assert!(!rendered.iter().any(|l| l.contains("secret")));
        assert!(rendered.iter().any(|l| l.contains("[x] Remember me")));
        assert!(rendered.iter().any(|l| l.contains("[ Sign in ]")));
        assert!(rendered.iter().any(|l| l.contains("Forgot your password?")));
        assert!(!rendered.iter().any(|l| l.contains("Send instructions")));
    }

    #[test]
    fn test_recover_mode_lines() {
        let mut form = FormState::new(false);
        form.show_recover();

        let rendered = text(&form_lines(&form, 0));

        assert!(!rendered.iter().any(|l| l.contains("Password")));
        assert!(!rendered.iter().any(|l| l.contains("Remember me")));
        assert!(rendered.iter().any(|l| l.contains("[ Send instructions ]")));
        assert!(rendered.iter().any(|l| l.contains("Back to sign in")));
    }

    #[test]
    fn test_placeholder_renders_blank() {
        let mut field = InputField::default();
        field.set_value(crate::form::PASSWORD_PLACEHOLDER);
        assert_eq!(display_value(&field, true), " ".repeat(8));
    }

    #[test]
    fn test_invalid_field_shows_message() {
        let mut form = FormState::new(false);
        form.email.set_value("ab");
        form.email.auto_validate();

        let rendered = text(&form_lines(&form, 0));
        assert!(rendered.iter().any(|l| l.contains("Email too short")));
    }

    #[test]
    fn test_submitting_shows_spinner() {
        let mut form = FormState::new(false);
        form.sign_in.set_submitting(true);
        let rendered = text(&form_lines(&form, 1));
        assert!(rendered.iter().any(|l| l.contains("[ Sign in ] ◓")));
    }

    #[test]
    fn test_toast_area_uses_anchor() {
        let mut toast = Toast::default();
        let form_area = Rect::new(10, 5, 40, 14);
        assert_eq!(toast_area(&toast, form_area), Rect::new(10, 16, 40, 3));

        toast.fit_into = Some(Rect::new(0, 0, 80, 2));
        assert_eq!(toast_area(&toast, form_area), Rect::new(0, 0, 80, 2));
    }
}
