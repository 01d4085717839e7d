use std::io::{self, BufRead, Write};

use spaced_lib::flashcards::algorithm::{format_interval, preview_intervals};
use spaced_lib::flashcards::{Card, Progress, PromptResponse, Rating, RatingPrompt, SchedulerConfig};

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const CYAN: &str = "\x1b[36m";
}

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Rating prompt on a line-oriented terminal.
///
/// Shows the front, waits for Enter, shows the back, then reads a rating
/// key until a valid one arrives. `q` or end of input cancels.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    config: SchedulerConfig,
    use_color: bool,
}

/// A line of input, or the user asking to stop
enum Line {
    Text(String),
    Quit,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W, config: SchedulerConfig, use_color: bool) -> Self {
        Self {
            input,
            output,
            config,
            use_color,
        }
    }

    fn read_line(&mut self) -> io::Result<Line> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Line::Quit);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(Line::Quit);
        }
        Ok(Line::Text(line.to_string()))
    }

    fn rating_hint(&self, card: &Card) -> String {
        preview_intervals(card, &self.config)
            .iter()
            .map(|(rating, days)| format!("{}:{} ({})", rating.key(), rating, format_interval(*days)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn converse(&mut self, card: &Card, progress: Progress) -> io::Result<PromptResponse> {
        if self.use_color {
            write!(self.output, "{}", CLEAR_SCREEN)?;
        }
        let rule = "=".repeat(20);
        writeln!(self.output, "Card {}/{}", progress.current, progress.total)?;
        writeln!(self.output, "\n{}", rule)?;
        writeln!(
            self.output,
            "{} {}",
            paint("FRONT:", Color::BOLD, self.use_color),
            card.front
        )?;
        writeln!(self.output, "{}", rule)?;
        write!(
            self.output,
            "\n{}",
            paint("Press Enter to reveal answer (q to quit)...", Color::DIM, self.use_color)
        )?;
        self.output.flush()?;

        if let Line::Quit = self.read_line()? {
            return Ok(PromptResponse::Cancelled);
        }

        writeln!(
            self.output,
            "\n{} {}",
            paint("BACK:", Color::CYAN, self.use_color),
            card.back
        )?;
        let hint = self.rating_hint(card);
        write!(self.output, "\nQuality ({}): ", hint)?;
        self.output.flush()?;

        loop {
            let key = match self.read_line()? {
                Line::Quit => return Ok(PromptResponse::Cancelled),
                Line::Text(key) => key,
            };
            match Rating::from_key(&key) {
                Ok(rating) => {
                    let color = if rating == Rating::Again { Color::RED } else { Color::GREEN };
                    writeln!(self.output, "{}", paint(rating.label(), color, self.use_color))?;
                    return Ok(PromptResponse::Rated(rating));
                }
                Err(_) => {
                    write!(self.output, "Invalid input. Please enter 1, 2, 3, or 4: ")?;
                    self.output.flush()?;
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> RatingPrompt for TerminalPrompt<R, W> {
    fn ask_rating(&mut self, card: &Card, progress: Progress) -> PromptResponse {
        match self.converse(card, progress) {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Terminal I/O failed, ending review: {}", e);
                PromptResponse::Cancelled
            }
        }
    }
}
