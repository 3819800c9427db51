use crate::core::app::App;
use crate::core::constants::{INDICATOR_SPACE, INPUT_AREA_HEIGHT};
use crate::ui::picker::PickerState;
use crate::utils::scroll::ScrollCalculator;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn ui(f: &mut Frame, app: &App) {
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background_color)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INPUT_AREA_HEIGHT)])
        .split(f.area());

    // Pre-wrapped lines, so the scroll offset counts the same lines that are
    // actually drawn
    let lines = app.build_display_lines();
    let wrapped = ScrollCalculator::prewrap_lines(&lines, chunks[0].width);

    let available_height = chunks[0].height.saturating_sub(1); // Account for title
    let total_wrapped_lines = wrapped.len() as u16;

    // Always use the app's scroll_offset, but ensure it's within bounds
    let max_offset = if total_wrapped_lines > available_height {
        total_wrapped_lines.saturating_sub(available_height)
    } else {
        0
    };
    let scroll_offset = app.scroll_offset.min(max_offset);

    let title = format!(
        "LM Chat v{} - {} • Logging: {}",
        env!("CARGO_PKG_VERSION"),
        app.model,
        app.get_logging_status()
    );

    let messages_paragraph = Paragraph::new(wrapped)
        .block(Block::default().title(Span::styled(title, app.theme.title_style)))
        .scroll((scroll_offset, 0));

    f.render_widget(messages_paragraph, chunks[0]);

    render_input_area(f, app, chunks[1]);

    if let Some(ref picker) = app.picker {
        render_model_picker(f, app, picker);
    }
}

fn render_input_area(f: &mut Frame, app: &App, area: Rect) {
    let input_title = if app.is_streaming {
        "Type your message (Esc to interrupt, /help for help, Ctrl+C to quit)"
    } else {
        "Type your message (/help for help, Ctrl+C to quit)"
    };

    let inner_width = area.width.saturating_sub(2) as usize; // Remove left and right borders

    // Horizontal scroll keeps the cursor in view once the input outgrows
    // the box
    let cursor_col = app.input_cursor_position.min(app.input.chars().count());
    let h_scroll = if inner_width > 0 {
        cursor_col.saturating_sub(inner_width - 1) as u16
    } else {
        0
    };

    let input_paragraph = if app.is_streaming {
        // Pulse animation (0.0 to 1.0 over 1 second)
        let elapsed = app.pulse_start.elapsed().as_millis() as f32 / 1000.0;
        let pulse_phase = (elapsed * 2.0) % 2.0; // 2 cycles per second
        let pulse_intensity = if pulse_phase < 1.0 {
            pulse_phase
        } else {
            2.0 - pulse_phase
        };

        let symbol = if pulse_intensity < 0.33 {
            "○"
        } else if pulse_intensity < 0.66 {
            "◐"
        } else {
            "●"
        };

        // The indicator sits one cell in from the right border; long input
        // is truncated with an ellipsis rather than scrolled
        let input_chars: Vec<char> = app.input.chars().collect();
        let text_width = inner_width.saturating_sub(3); // Gap + indicator + padding
        let mut text: String = input_chars.iter().take(text_width).collect();
        if input_chars.len() > text_width && text_width >= 3 {
            text = input_chars.iter().take(text_width - 3).collect();
            text.push_str("...");
        }
        let pad = inner_width
            .saturating_sub(2)
            .saturating_sub(text.chars().count());

        Paragraph::new(Line::from(vec![
            Span::styled(text, app.theme.input_text_style),
            Span::raw(" ".repeat(pad)),
            Span::styled(symbol, app.theme.streaming_indicator_style),
        ]))
    } else {
        Paragraph::new(app.input.as_str())
            .style(app.theme.input_text_style)
            .scroll((0, h_scroll))
    };

    let input = input_paragraph.block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.input_border_style)
            .title(Span::styled(input_title, app.theme.input_title_style)),
    );

    f.render_widget(input, area);

    // Place the terminal cursor inside the box, clamped to its right edge
    let max_cursor_x = if app.is_streaming {
        // Borders plus the indicator and its margin
        area.width.saturating_sub(2).saturating_sub(INDICATOR_SPACE)
    } else {
        area.width.saturating_sub(2) // Just account for borders
    };
    let cursor_x = ((cursor_col as u16).saturating_sub(h_scroll) + 1).min(max_cursor_x);
    f.set_cursor_position((area.x + cursor_x, area.y + 1));
}

fn render_model_picker(f: &mut Frame, app: &App, picker: &PickerState) {
    let area = f.area();

    // Calculate popup size and position (centered)
    let popup_width = 40.min(area.width.saturating_sub(4));
    let popup_height = (picker.items.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} (Enter to select, Esc to cancel) ", picker.title));

    let items: Vec<ListItem> = picker
        .items
        .iter()
        .map(|item| {
            let style = if item.id == app.model {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", item.label)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(picker.selected));
    f.render_stateful_widget(list, popup_area, &mut state);
}
