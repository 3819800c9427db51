//! Scroll math over pre-wrapped display lines
//!
//! Transcript lines are wrapped up front to the terminal width, so the
//! renderer never relies on ratatui's built-in wrapping and scroll offsets
//! always agree with what is actually drawn.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Handles all scroll-related calculations and line wrapping
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Pre-wrap the given lines to a specific width, preserving styles.
    /// Wraps at word boundaries and breaks tokens wider than the line.
    pub fn prewrap_lines(lines: &[Line], terminal_width: u16) -> Vec<Line<'static>> {
        let width = terminal_width as usize;
        // Zero width: nothing sensible to wrap to, just clone as owned
        if width == 0 {
            return lines.iter().map(owned_line).collect();
        }

        let mut wrapper = LineWrapper::new(width, lines.len());
        for line in lines {
            if line.spans.is_empty() {
                wrapper.out.push(Line::from(""));
                continue;
            }
            for span in &line.spans {
                for ch in span.content.chars() {
                    wrapper.push_char(ch, span.style);
                }
            }
            wrapper.finish_line();
        }
        wrapper.out
    }

    /// How many visual lines the given display lines occupy at this width.
    /// Single source of truth for the scroll calculations below.
    pub fn calculate_wrapped_line_count(lines: &[Line], terminal_width: u16) -> u16 {
        Self::prewrap_lines(lines, terminal_width).len() as u16
    }

    /// Scroll offset that shows the bottom of the transcript
    pub fn calculate_scroll_to_bottom(
        lines: &[Line],
        terminal_width: u16,
        available_height: u16,
    ) -> u16 {
        let total_wrapped_lines = Self::calculate_wrapped_line_count(lines, terminal_width);

        if total_wrapped_lines > available_height {
            total_wrapped_lines.saturating_sub(available_height)
        } else {
            0
        }
    }

    /// Maximum valid scroll offset; used to clamp manual scrolling
    pub fn calculate_max_scroll_offset(
        lines: &[Line],
        terminal_width: u16,
        available_height: u16,
    ) -> u16 {
        Self::calculate_scroll_to_bottom(lines, terminal_width, available_height)
    }
}

fn owned_line(line: &Line) -> Line<'static> {
    if line.spans.is_empty() {
        return Line::from("");
    }
    let spans: Vec<Span<'static>> = line
        .spans
        .iter()
        .map(|s| Span::styled(s.content.to_string(), s.style))
        .collect();
    Line::from(spans)
}

/// Incremental word wrapper that merges adjacent same-style runs so the
/// wrapped output carries the fewest spans possible.
struct LineWrapper {
    width: usize,
    out: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    current_width: usize,
    emitted_any: bool,
    // Word accumulated so far, split into styled segments
    word: Vec<(String, Style)>,
    word_width: usize,
}

impl LineWrapper {
    fn new(width: usize, capacity: usize) -> Self {
        Self {
            width,
            out: Vec::with_capacity(capacity),
            current: Vec::new(),
            current_width: 0,
            emitted_any: false,
            word: Vec::new(),
            word_width: 0,
        }
    }

    fn push_char(&mut self, ch: char, style: Style) {
        if ch == ' ' {
            self.flush_word();
            // A space that no longer fits wraps and is dropped, so
            // continuation lines never start with one.
            if self.current_width < self.width {
                self.append_run(style, " ");
                self.current_width += 1;
            } else {
                self.emit_line();
            }
        } else {
            match self.word.last_mut() {
                Some((text, last_style)) if *last_style == style => text.push(ch),
                _ => self.word.push((ch.to_string(), style)),
            }
            self.word_width += ch.width().unwrap_or(0);
        }
    }

    fn finish_line(&mut self) {
        self.flush_word();
        if !self.current.is_empty() {
            self.emit_line();
        }
        if !self.emitted_any {
            // Preserve a single empty visual line for whitespace-only inputs
            self.out.push(Line::from(""));
        }
        self.emitted_any = false;
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        // Wrap before the word if it would fit on a fresh line
        if self.current_width > 0 && self.current_width + self.word_width > self.width {
            self.emit_line();
        }
        // Place it, chunking tokens wider than the line
        for (text, style) in std::mem::take(&mut self.word) {
            for ch in text.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if self.current_width > 0 && self.current_width + ch_width > self.width {
                    self.emit_line();
                }
                let mut buf = [0u8; 4];
                self.append_run(style, ch.encode_utf8(&mut buf));
                self.current_width += ch_width;
            }
        }
        self.word_width = 0;
    }

    fn emit_line(&mut self) {
        self.out.push(Line::from(std::mem::take(&mut self.current)));
        self.current_width = 0;
        self.emitted_any = true;
    }

    fn append_run(&mut self, style: Style, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.current.last_mut() {
            if last.style == style {
                last.content.to_mut().push_str(text);
                return;
            }
        }
        self.current.push(Span::styled(text.to_string(), style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Modifier};

    #[test]
    fn short_line_passes_through_unwrapped() {
        let lines = vec![Line::from("hello world")];
        let pre = ScrollCalculator::prewrap_lines(&lines, 40);
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].to_string(), "hello world");
    }

    #[test]
    fn empty_lines_are_preserved() {
        let lines = vec![Line::from("a"), Line::from(""), Line::from("b")];
        let pre = ScrollCalculator::prewrap_lines(&lines, 40);
        assert_eq!(pre.len(), 3);
        assert_eq!(pre[1].to_string(), "");
    }

    #[test]
    fn wraps_at_word_boundaries_without_leading_spaces() {
        let lines = vec![Line::from("alpha beta gamma delta")];
        let pre = ScrollCalculator::prewrap_lines(&lines, 12);
        assert!(pre.len() > 1);
        for line in &pre {
            let s = line.to_string();
            assert!(!s.starts_with(' '), "wrapped line starts with space: '{s}'");
            assert!(s.trim_end().chars().count() <= 12);
        }
        let joined: String = pre.iter().map(|l| l.to_string() + " ").collect();
        assert!(joined.contains("alpha"));
        assert!(joined.contains("delta"));
    }

    #[test]
    fn long_tokens_are_chunked() {
        let lines = vec![Line::from("supercalifragilisticexpialidocious")];
        let pre = ScrollCalculator::prewrap_lines(&lines, 10);
        assert!(pre.len() > 3);
        for line in &pre {
            assert!(line.to_string().chars().count() <= 10);
        }
    }

    #[test]
    fn styles_survive_wrapping_and_merge_into_runs() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let cyan = Style::default().fg(Color::Cyan);
        let lines = vec![Line::from(vec![
            Span::styled("You: ", bold),
            Span::styled("hi ", cyan),
            Span::styled("there", cyan),
        ])];
        let pre = ScrollCalculator::prewrap_lines(&lines, 40);
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].spans.len(), 2);
        assert_eq!(pre[0].spans[0].style, bold);
        assert_eq!(pre[0].spans[1].content.as_ref(), "hi there");
        assert_eq!(pre[0].spans[1].style, cyan);
    }

    #[test]
    fn wide_characters_count_by_display_width() {
        // Four CJK chars at display width 2 each only fit two per 4-cell line
        let lines = vec![Line::from("你好世界")];
        let pre = ScrollCalculator::prewrap_lines(&lines, 4);
        assert_eq!(pre.len(), 2);
        assert_eq!(pre[0].to_string(), "你好");
        assert_eq!(pre[1].to_string(), "世界");
    }

    #[test]
    fn zero_width_returns_lines_unchanged() {
        let lines = vec![Line::from("anything at all")];
        let pre = ScrollCalculator::prewrap_lines(&lines, 0);
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].to_string(), "anything at all");
    }

    #[test]
    fn scroll_to_bottom_is_zero_when_content_fits() {
        let lines = vec![Line::from("one"), Line::from("two")];
        assert_eq!(ScrollCalculator::calculate_scroll_to_bottom(&lines, 80, 10), 0);
    }

    #[test]
    fn scroll_to_bottom_counts_overflow_lines() {
        let lines: Vec<Line> = (0..12).map(|i| Line::from(format!("line {i}"))).collect();
        let scroll = ScrollCalculator::calculate_scroll_to_bottom(&lines, 80, 5);
        assert_eq!(scroll, 7);
        assert_eq!(
            ScrollCalculator::calculate_max_scroll_offset(&lines, 80, 5),
            scroll
        );
    }

    #[test]
    fn wrapped_count_includes_continuation_lines() {
        let lines = vec![Line::from("alpha beta gamma delta epsilon zeta")];
        let count = ScrollCalculator::calculate_wrapped_line_count(&lines, 12);
        assert!(count > 1);
        assert_eq!(
            count as usize,
            ScrollCalculator::prewrap_lines(&lines, 12).len()
        );
    }
}
