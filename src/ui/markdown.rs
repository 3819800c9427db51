//! Renders transcript messages into styled display lines
//!
//! Assistant messages go through a CommonMark pass; user and system
//! messages stay plain text. Lines come out unwrapped, width handling
//! happens later in the scroll math.

use crate::core::message::Message;
use crate::ui::theme::Theme;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::collections::VecDeque;

#[derive(Clone, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

/// Build display lines for all messages. Each message contributes its own
/// block of lines followed by one blank separator line.
pub fn build_display_lines(messages: &VecDeque<Message>, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for msg in messages {
        match msg.role.as_str() {
            "system" => lines.extend(render_system_message(&msg.content, theme)),
            "user" => lines.extend(render_user_message(&msg.content, theme)),
            _ => lines.extend(render_assistant_markdown(&msg.content, theme)),
        }
    }
    lines
}

/// User text is shown verbatim under a "You: " prefix, with follow-on lines
/// indented to align.
fn render_user_message(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut out: Vec<Line<'static>> = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if i == 0 {
            out.push(Line::from(vec![
                Span::styled("You: ", theme.user_prefix_style),
                Span::styled(detab(line), theme.user_text_style),
            ]));
        } else {
            out.push(Line::from(vec![
                Span::raw("     "),
                Span::styled(detab(line), theme.user_text_style),
            ]));
        }
    }
    if !out.is_empty() {
        out.push(Line::from(""));
    }
    out
}

fn render_system_message(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut out: Vec<Line<'static>> = Vec::new();
    for l in content.lines() {
        if l.trim().is_empty() {
            out.push(Line::from(""));
        } else {
            let text = detab(l);
            // Heuristic: if line starts with "Error:", render with error style
            if text.starts_with("Error:") {
                out.push(Line::from(Span::styled(text, theme.error_text_style)));
            } else {
                out.push(Line::from(Span::styled(text, theme.system_text_style)));
            }
        }
    }
    if !out.is_empty() {
        out.push(Line::from(""));
    }
    out
}

/// CommonMark rendering for assistant replies: headings, emphasis, inline
/// code, fenced code blocks, lists and blockquotes. Links render as their
/// text; raw HTML is dropped.
fn render_assistant_markdown(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let parser = Parser::new_ext(content, Options::empty());

    let mut lines: Vec<Line<'static>> = Vec::new();
    // Buffer for the current paragraph/heading/list item
    let mut current_spans: Vec<Span<'static>> = Vec::new();
    // Style stack for inline formatting
    let mut style_stack: Vec<Style> = vec![theme.md_paragraph_style()];
    let mut list_stack: Vec<ListKind> = Vec::new();
    let mut in_code_block = false;
    let mut code_block_lines: Vec<String> = Vec::new();

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    flush_current_line(&mut lines, &mut current_spans);
                    style_stack.push(theme.md_heading_style(level as u8));
                }
                Tag::BlockQuote(_) => {
                    style_stack.push(theme.md_blockquote_style());
                }
                Tag::List(start) => {
                    list_stack.push(match start {
                        Some(n) => ListKind::Ordered(n),
                        None => ListKind::Unordered,
                    });
                }
                Tag::Item => {
                    flush_current_line(&mut lines, &mut current_spans);
                    let marker = match list_stack.last_mut() {
                        Some(ListKind::Ordered(k)) => {
                            let cur = *k;
                            *k += 1;
                            format!("{}. ", cur)
                        }
                        _ => "- ".to_string(),
                    };
                    current_spans.push(Span::styled(marker, theme.md_list_marker_style()));
                }
                Tag::CodeBlock(_) => {
                    flush_current_line(&mut lines, &mut current_spans);
                    in_code_block = true;
                    code_block_lines.clear();
                }
                Tag::Emphasis => {
                    let new = style_stack
                        .last()
                        .copied()
                        .unwrap_or_default()
                        .add_modifier(Modifier::ITALIC);
                    style_stack.push(new);
                }
                Tag::Strong => {
                    let new = style_stack
                        .last()
                        .copied()
                        .unwrap_or_default()
                        .add_modifier(Modifier::BOLD);
                    style_stack.push(new);
                }
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Paragraph => {
                    flush_current_line(&mut lines, &mut current_spans);
                    lines.push(Line::from(""));
                }
                TagEnd::Heading(_) => {
                    flush_current_line(&mut lines, &mut current_spans);
                    lines.push(Line::from(""));
                    style_stack.pop();
                }
                TagEnd::BlockQuote(_) => {
                    // The quoted paragraphs already pushed their separators
                    flush_current_line(&mut lines, &mut current_spans);
                    style_stack.pop();
                }
                TagEnd::List(_) => {
                    flush_current_line(&mut lines, &mut current_spans);
                    list_stack.pop();
                    if list_stack.is_empty() {
                        lines.push(Line::from(""));
                    }
                }
                TagEnd::Item => {
                    flush_current_line(&mut lines, &mut current_spans);
                }
                TagEnd::CodeBlock => {
                    for l in code_block_lines.drain(..) {
                        lines.push(Line::from(Span::styled(
                            l,
                            theme.md_codeblock_text_style(),
                        )));
                    }
                    lines.push(Line::from(""));
                    in_code_block = false;
                }
                TagEnd::Emphasis | TagEnd::Strong => {
                    style_stack.pop();
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_code_block {
                    for l in text.lines() {
                        code_block_lines.push(detab(l));
                    }
                } else {
                    let style = *style_stack.last().unwrap_or(&theme.md_paragraph_style());
                    current_spans.push(Span::styled(detab(&text), style));
                }
            }
            Event::Code(code) => {
                current_spans.push(Span::styled(detab(&code), theme.md_inline_code_style()));
            }
            Event::SoftBreak | Event::HardBreak => {
                flush_current_line(&mut lines, &mut current_spans);
            }
            Event::Rule => {
                flush_current_line(&mut lines, &mut current_spans);
                lines.push(Line::from(""));
            }
            _ => {}
        }
    }

    flush_current_line(&mut lines, &mut current_spans);
    if !lines.is_empty()
        && lines
            .last()
            .map(|l| !l.to_string().is_empty())
            .unwrap_or(false)
    {
        lines.push(Line::from(""));
    }
    lines
}

fn flush_current_line(lines: &mut Vec<Line<'static>>, current_spans: &mut Vec<Span<'static>>) {
    if !current_spans.is_empty() {
        lines.push(Line::from(std::mem::take(current_spans)));
    }
}

fn detab(s: &str) -> String {
    // Simple, predictable detab: replace tabs with 4 spaces
    s.replace('\t', "    ")
}
