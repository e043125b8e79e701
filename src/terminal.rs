use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen, size,
    },
};
use std::io::{self, Write, stdout};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
        }
    }
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;
        Self::with_size(width, height, alternate_screen)
    }

    /// Terminal with a fixed buffer size (print mode, or when stdout is not a tty)
    pub fn with_size(width: u16, height: u16, alternate_screen: bool) -> io::Result<Self> {
        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        let buffer = vec![vec![Cell::default(); width as usize]; height as usize];

        Ok(Self {
            width,
            height,
            buffer,
            alternate_screen,
        })
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Current size of the real terminal, falling back to the buffer size
    pub fn query_size(&self) -> (u16, u16) {
        size().unwrap_or((self.width, self.height))
    }

    /// Resize the buffer, discarding its contents
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>) {
        self.set_with_bg(x, y, ch, fg, None);
    }

    /// Set a character with both foreground and background colors
    pub fn set_with_bg(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bg: Option<Color>) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bg };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg);
        }
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(y as usize)?.get(x as usize)
    }

    /// Render the entire buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if let Some(bg) = cell.bg {
                    queue!(out, SetBackgroundColor(bg))?;
                }
                match cell.fg {
                    Some(color) => queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?,
                    None => queue!(out, Print(cell.ch), ResetColor)?,
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Check for keypress (non-blocking), returns (code, modifiers)
    pub fn check_key(&self) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
        if poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some((key_event.code, key_event.modifiers)));
            }
        }
        Ok(None)
    }

    /// Sleep for specified duration
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds.max(0.0)));
    }

    /// Buffer as text with ANSI truecolor escapes (for print mode)
    pub fn to_ansi(&self) -> String {
        let mut out = String::new();
        for row in &self.buffer {
            for cell in row {
                if cell.fg.is_none() && cell.bg.is_none() {
                    out.push(cell.ch);
                    continue;
                }
                if let Some(code) = cell.fg.and_then(|c| ansi_color(c, false)) {
                    out.push_str(&code);
                }
                if let Some(code) = cell.bg.and_then(|c| ansi_color(c, true)) {
                    out.push_str(&code);
                }
                out.push(cell.ch);
                out.push_str("\x1b[0m");
            }
            out.push('\n');
        }
        out
    }

    /// Print buffer to stdout with ANSI colors
    pub fn print_to_stdout(&self) -> io::Result<()> {
        let mut out = stdout();
        out.write_all(self.to_ansi().as_bytes())?;
        out.flush()
    }
}

fn ansi_color(color: Color, background: bool) -> Option<String> {
    let base = if background { 40 } else { 30 };
    let code = match color {
        Color::Rgb { r, g, b } => {
            return Some(format!("\x1b[{};2;{};{};{}m", base + 8, r, g, b));
        }
        Color::AnsiValue(v) => return Some(format!("\x1b[{};5;{}m", base + 8, v)),
        // Standard colors (0-7)
        Color::Black => base,
        Color::DarkRed => base + 1,
        Color::DarkGreen => base + 2,
        Color::DarkYellow => base + 3,
        Color::DarkBlue => base + 4,
        Color::DarkMagenta => base + 5,
        Color::DarkCyan => base + 6,
        Color::Grey => base + 7,
        // Bright colors (8-15)
        Color::DarkGrey => base + 60,
        Color::Red => base + 61,
        Color::Green => base + 62,
        Color::Yellow => base + 63,
        Color::Blue => base + 64,
        Color::Magenta => base + 65,
        Color::Cyan => base + 66,
        Color::White => base + 67,
        _ => return None,
    };
    Some(format!("\x1b[{}m", code))
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), ResetColor, Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

/// Helper to create RGB colors
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}
