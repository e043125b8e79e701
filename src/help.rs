use crate::terminal::Terminal;
use crossterm::style::Color;

/// Render a centered help overlay box with the provided text.
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    let (width, height) = term.size();

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2; // 1 row padding top/bottom

    // Center the box
    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    let border = Some(Color::White);
    let text = Some(Color::Grey);
    let fill = Some(Color::Black);

    let mut put = |x: usize, y: usize, ch: char, fg: Option<Color>| {
        term.set_with_bg(x as i32, y as i32, ch, fg, fill);
    };

    // Top border: ┌─────┐
    put(start_x, start_y, '┌', border);
    for x in 1..box_width - 1 {
        put(start_x + x, start_y, '─', border);
    }
    put(start_x + box_width - 1, start_y, '┐', border);

    // Content rows with side borders
    for (i, line) in lines.iter().enumerate() {
        let y = start_y + 1 + i;
        put(start_x, y, '│', border);

        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        for (j, ch) in padded.chars().enumerate() {
            put(start_x + 1 + j, y, ch, text);
        }

        put(start_x + box_width - 1, y, '│', border);
    }

    // Bottom border: └─────┘
    let bottom_y = start_y + box_height - 1;
    put(start_x, bottom_y, '└', border);
    for x in 1..box_width - 1 {
        put(start_x + x, bottom_y, '─', border);
    }
    put(start_x + box_width - 1, bottom_y, '┘', border);
}
