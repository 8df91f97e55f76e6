use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal, Result};

/// Raw-mode terminal wrapper. Keeps a shadow buffer of everything drawn
/// so a centered overlay message can be removed again by restoring what
/// was underneath, without redrawing the whole screen.
pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: (u16, u16),
    width: u16,
    height: u16,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        self.clear()
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking)?;
        execute!(self.stdout, LeaveAlternateScreen)
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    /// Drains every key event currently queued, without blocking.
    pub fn read_key_events(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Anything outside the terminal is clipped, not wrapped.
    pub fn print_at(&mut self, pos: (u16, u16), ch: char) -> Result<()> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        self.screen[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
        Ok(())
    }

    pub fn print_text(&mut self, pos: (u16, u16), text: &str) -> Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as u16, pos.1), ch)?;
        }
        Ok(())
    }

    /// The terminal bell, our entire audio department.
    pub fn beep(&mut self) -> Result<()> {
        queue!(self.stdout, style::Print('\u{7}'))
    }

    pub fn draw_border(&mut self, top_left: (u16, u16), size: (u16, u16)) -> Result<()> {
        let (x0, y0) = top_left;
        let (width, height) = size;

        for x in 0..width {
            let ch = if x == 0 || x == width - 1 { '+' } else { '-' };
            self.print_at((x0 + x, y0), ch)?;
            self.print_at((x0 + x, y0 + height - 1), ch)?;
        }

        for y in 1..height - 1 {
            self.print_at((x0, y0 + y), '|')?;
            self.print_at((x0 + width - 1, y0 + y), '|')?;
        }

        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as u16;
        let msg_width = (lines.iter().map(|x| x.len()).max().unwrap_or(0) + 2) as u16;
        let center = (self.width / 2, self.height / 2);
        // a message wider than the terminal pins to the left edge and
        // gets clipped on the right by print_at
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as u16 + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as u16, y), ch)?;
            }
        }

        self.current_msg = Some(Message { top_left, width: msg_width, height: msg_height });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        let top_left = msg.top_left;
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (top_left.0 + x_diff, top_left.1 + y_diff);
                if x >= self.width || y >= self.height {
                    continue;
                }
                let ch = self.screen[self.width as usize * y as usize + x as usize];
                self.print_at_no_save((x, y), ch)?;
            }
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at_no_save(&mut self, pos: (u16, u16), ch: char) -> Result<()> {
        // Used for overlay messages, which must not end up in the
        // shadow buffer that restores the board beneath them
        if pos.0 >= self.width || pos.1 >= self.height {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }

    #[cfg(test)]
    fn sized(width: u16, height: u16) -> Self {
        let screen = vec![' '; width as usize * height as usize];
        TermManager { width, height, stdout: stdout(), screen, current_msg: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_wider_than_the_terminal_is_clipped() {
        let mut term = TermManager::sized(29, 30);
        term.show_message(&["Press an arrow key to play again"]).unwrap();
        assert!(term.has_message());
        term.hide_message().unwrap();
        assert!(!term.has_message());
    }

    #[test]
    fn overlay_on_a_tiny_terminal_does_not_panic() {
        let mut term = TermManager::sized(4, 2);
        term.show_message(&["Paused", "Press Esc to resume"]).unwrap();
        term.hide_message().unwrap();
    }

    #[test]
    fn printing_outside_the_terminal_is_ignored() {
        let mut term = TermManager::sized(10, 5);
        term.print_at((12, 3), 'x').unwrap();
        term.print_at((3, 7), 'x').unwrap();

        // a line running off the right edge keeps what fits
        term.print_text((7, 4), "a long score line").unwrap();
        assert_eq!(term.screen[10 * 4 + 7], 'a');
        assert_eq!(term.screen[10 * 4 + 9], 'l');
    }
}
