//! Pure view/render functions for the login screen.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never
//! mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::form;
use crate::state::AppState;

const FORM_WIDTH: u16 = 52;
const FORM_HEIGHT: u16 = 16;

/// Renders the login screen to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let form_area = centered_area(area, FORM_WIDTH, FORM_HEIGHT);
    form::render_form(frame, &app.form, form_area, app.spinner_frame);

    let hint_y = form_area.y + form_area.height;
    if hint_y < area.y + area.height {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Tab to move, Enter to submit, Ctrl+C to quit",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(hint, Rect::new(form_area.x, hint_y, form_area.width, 1));
    }
}

/// Centers a `width` x `height` box in `area`, shrinking it to fit.
pub fn centered_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use casper_core::{LoginConfig, SavedCredentials};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn screen_text(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_render_login_screen() {
        let app = AppState::new(LoginConfig::default(), SavedCredentials::default());
        let text = screen_text(&app);
        assert!(text.contains("Sign in"));
        assert!(text.contains("Forgot your password?"));
        assert!(text.contains("Ctrl+C to quit"));
    }

    #[test]
    fn test_render_open_toast() {
        let mut app = AppState::new(LoginConfig::default(), SavedCredentials::default());
        app.form.open_toast("Wrong password or email", Some(false));
        assert!(screen_text(&app).contains("Wrong password or email"));
    }

    #[test]
    fn test_centered_area_fits_small_terminals() {
        assert_eq!(
            centered_area(Rect::new(0, 0, 100, 40), 52, 16),
            Rect::new(24, 12, 52, 16)
        );
        assert_eq!(
            centered_area(Rect::new(0, 0, 30, 10), 52, 16),
            Rect::new(0, 0, 30, 10)
        );
    }
}
