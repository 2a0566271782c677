use std::io::{self, BufRead, Write};

use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use crate::tags::{Prompter, canonical_genre};

/// Asks on stdout and reads answers line by line from stdin.
pub struct TerminalPrompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        self.read_line()
    }
}

/// `"1, 3 5"` -> `[1, 3, 5]`; `None` if anything isn't a number in range.
fn parse_selection(raw: &str, len: usize) -> Option<Vec<usize>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok().filter(|n| (1..=len).contains(n)))
        .collect()
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        loop {
            let answer = self.ask(&format!("{question} [y/n] "))?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer 'y' or 'n'.")?,
            }
        }
    }

    fn input(&mut self, prompt: &str) -> io::Result<String> {
        self.ask(prompt)
    }

    fn choose_genres(&mut self, available: &[&str]) -> io::Result<Vec<String>> {
        execute!(self.output, Clear(ClearType::All))?;
        writeln!(self.output, "Available genres:")?;
        for (i, genre) in available.iter().enumerate() {
            writeln!(self.output, "{:>3}. {genre}", i + 1)?;
        }
        loop {
            let raw = self.ask("Genre numbers or names, separated by commas ('enter' to skip): ")?;
            if raw.is_empty() {
                return Ok(Vec::new());
            }
            if let Some(picked) = parse_selection(&raw, available.len()) {
                return Ok(picked.into_iter().map(|n| available[n - 1].to_string()).collect());
            }
            let by_name: Option<Vec<String>> = raw
                .split(',')
                .map(|name| canonical_genre(name).map(str::to_string))
                .collect();
            match by_name {
                Some(names) => return Ok(names),
                None => writeln!(self.output, "Unknown genre in '{raw}', try again.")?,
            }
        }
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompter(input: &str) -> TerminalPrompter<&[u8], Vec<u8>> {
        TerminalPrompter::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn confirm_repeats_until_answered() {
        let mut p = prompter("maybe\nY\n");
        assert!(p.confirm("Save?").unwrap());
        let shown = String::from_utf8(p.output).unwrap();
        assert!(shown.contains("Please answer"));
    }

    #[test]
    fn input_is_trimmed_and_eof_is_an_error() {
        let mut p = prompter("  Jane Doe \n");
        assert_eq!(p.input("Author: ").unwrap(), "Jane Doe");
        assert_eq!(
            p.input("Title: ").unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn genres_by_number_or_name() {
        let available = ["Fantasy", "Horror", "Mystery"];
        let mut p = prompter("1, 3\n");
        assert_eq!(p.choose_genres(&available).unwrap(), ["Fantasy", "Mystery"]);

        let mut p = prompter("7\nhorror\n");
        assert_eq!(p.choose_genres(&available).unwrap(), ["Horror"]);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn say_reports_write_errors() {
        let mut p = TerminalPrompter::new("".as_bytes(), BrokenPipe);
        assert_eq!(p.say("hello").unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn selection_rejects_out_of_range() {
        assert_eq!(parse_selection("2 1", 3), Some(vec![2, 1]));
        assert_eq!(parse_selection("0", 3), None);
        assert_eq!(parse_selection("4", 3), None);
    }
}
