use engine::NoticeLevel;
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{app::ToastState, ui::theme::Theme};

/// Bottom-right notification for the tracker's latest notice.
pub fn render(frame: &mut Frame<'_>, area: Rect, toast: Option<&ToastState>) {
    let Some(toast) = toast else {
        return;
    };
    let theme = Theme::default();
    let message = toast.notice.message.as_str();

    let width = u16::try_from(message.chars().count() + 4)
        .unwrap_or(u16::MAX)
        .min(area.width);
    let height = 3u16.min(area.height);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    };

    let color = match toast.notice.level {
        NoticeLevel::Info => theme.text,
        NoticeLevel::Success => theme.positive,
        NoticeLevel::Error => theme.error,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme.surface));

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(Line::from(message))
            .style(Style::default().fg(color))
            .block(block),
        rect,
    );
}
