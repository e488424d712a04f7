use crate::forms::{Form, Key, Transition};
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    terminal::{self, ClearType, disable_raw_mode, enable_raw_mode},
};
use colored::Colorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use unicode_width::UnicodeWidthChar;

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! warning {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).yellow());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).yellow());
    }};
}

#[macro_export]
macro_rules! error {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).red());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).red());
    }};
}

#[macro_export]
macro_rules! status {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!($fmt $(, $($arg)*)?).green());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!("{}", $expr).green());
    }};
}

#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    // format string literal (with or without inline formatting or args)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), $fmt $(, $($arg)*)?);
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", $expr);
    }};
}

/// only printed with --verbose
#[macro_export]
macro_rules! debug {
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        if $crate::ui::is_verbose() {
            use colored::Colorize;
            use std::io::{self, Write};
            let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).dimmed());
        }
    }};
}

/// what a form needs from the terminal
pub trait Terminal {
    /// called before the first frame of a form
    fn enter(&mut self) -> Result<()>;
    /// called once the form has finished, successfully or not
    fn leave(&mut self) -> Result<()>;
    /// replace the previous frame with `frame`
    fn draw(&mut self, frame: &str) -> Result<()>;
    /// block until the next decodable key
    fn next_key(&mut self) -> Result<Key>;
    /// free-text line; `None` when the user aborts
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// run a form to completion; `None` means it was cancelled
pub fn run_form<F, T>(term: &mut T, form: F) -> Result<Option<F::Output>>
where
    F: Form,
    T: Terminal + ?Sized,
{
    term.enter()?;
    let result = drive(term, form);
    let left = term.leave();
    let output = result?;
    left?;
    Ok(output)
}

fn drive<F, T>(term: &mut T, mut form: F) -> Result<Option<F::Output>>
where
    F: Form,
    T: Terminal + ?Sized,
{
    loop {
        term.draw(&form.view())?;
        let key = term.next_key()?;
        form = match form.update(key) {
            Transition::Stay(next) => next,
            Transition::Done(output) => return Ok(Some(output)),
            Transition::Cancel => return Ok(None),
        };
    }
}

/// the real terminal: raw-mode key events via crossterm, rustyline for text
#[derive(Default)]
pub struct Console {
    /// rows above the cursor that belong to the current frame
    drawn: u16,
    raw: bool,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    fn erase(&mut self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveToColumn(0))?;
        if self.drawn > 0 {
            queue!(out, cursor::MoveUp(self.drawn))?;
        }
        queue!(out, terminal::Clear(ClearType::FromCursorDown))?;
        self.drawn = 0;
        Ok(())
    }
}

impl Terminal for Console {
    fn enter(&mut self) -> Result<()> {
        enable_raw_mode().context("this command requires an interactive terminal")?;
        self.raw = true;
        self.drawn = 0;
        let mut stdout = io::stdout();
        queue!(stdout, cursor::Hide)?;
        stdout.flush()?;
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        self.erase(&mut stdout)?;
        queue!(stdout, cursor::Show)?;
        stdout.flush()?;
        disable_raw_mode().context("failed to restore terminal mode")?;
        self.raw = false;
        Ok(())
    }

    fn draw(&mut self, frame: &str) -> Result<()> {
        let (columns, rows) = terminal::size().unwrap_or((80, 24));
        let (lines, used) = fit_frame(frame, columns, rows);
        let mut stdout = io::stdout();
        self.erase(&mut stdout)?;
        // raw mode does not translate \n into \r\n
        write!(stdout, "{}", lines.join("\r\n"))?;
        stdout.flush()?;
        self.drawn = u16::try_from(used.saturating_sub(1)).unwrap_or(u16::MAX);
        Ok(())
    }

    fn next_key(&mut self) -> Result<Key> {
        loop {
            let event = event::read().context("failed to read terminal input")?;
            if let Event::Key(key_event) = event
                && key_event.kind == KeyEventKind::Press
                && let Some(key) = decode(key_event)
            {
                return Ok(key);
            }
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        use rustyline::DefaultEditor;
        use rustyline::error::ReadlineError;

        let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
        match editor.readline(prompt) {
            Ok(line) => Ok(Some(line.trim().to_string())),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                info!("^C");
                Ok(None)
            }
            Err(e) => Err(e).context("failed to read input"),
        }
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        if self.raw {
            let _ = queue!(io::stdout(), cursor::Show);
            let _ = io::stdout().flush();
            disable_raw_mode().ok();
        }
    }
}

/// columns a line occupies on screen, skipping ANSI colour sequences
fn visible_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            if chars.next() == Some('[') {
                // CSI parameters run until a final byte in @..=~
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            continue;
        }
        width += c.width().unwrap_or(0);
    }
    width
}

/// terminal rows taken by `line` once it wraps at `columns`
fn line_rows(line: &str, columns: u16) -> usize {
    visible_width(line)
        .div_ceil(usize::from(columns.max(1)))
        .max(1)
}

/// the lines of `frame` that fit on a `columns` x `rows` screen, plus the
/// number of rows they take
///
/// a frame taller than the screen is cut short and ends in a marker line,
/// otherwise the cursor could not move back up over all of it
fn fit_frame(frame: &str, columns: u16, rows: u16) -> (Vec<String>, usize) {
    let lines: Vec<&str> = frame.lines().collect();
    let height = usize::from(rows.max(1));
    let total: usize = lines.iter().map(|line| line_rows(line, columns)).sum();
    if total <= height {
        return (lines.iter().map(|line| line.to_string()).collect(), total);
    }

    let mut kept = Vec::new();
    let mut used = 0;
    for line in &lines {
        let need = line_rows(line, columns);
        // one row stays free for the marker
        if used + need + 1 > height {
            break;
        }
        used += need;
        kept.push(line.to_string());
    }
    let marker: String = format!("... {} more lines", lines.len() - kept.len())
        .chars()
        .take(usize::from(columns.max(1)))
        .collect();
    kept.push(marker.dimmed().to_string());
    (kept, used + 1)
}

/// map a crossterm key event to a form key
fn decode(event: KeyEvent) -> Option<Key> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c') if ctrl => Some(Key::Interrupt),
        KeyCode::Char('d') if ctrl => Some(Key::Finish),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::ConfirmForm;
    use anyhow::bail;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Recorder {
        keys: VecDeque<Key>,
        frames: Vec<String>,
        entered: usize,
        left: usize,
    }

    impl Terminal for Recorder {
        fn enter(&mut self) -> Result<()> {
            self.entered += 1;
            Ok(())
        }

        fn leave(&mut self) -> Result<()> {
            self.left += 1;
            Ok(())
        }

        fn draw(&mut self, frame: &str) -> Result<()> {
            self.frames.push(frame.to_string());
            Ok(())
        }

        fn next_key(&mut self) -> Result<Key> {
            match self.keys.pop_front() {
                Some(key) => Ok(key),
                None => bail!("out of keys"),
            }
        }

        fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn run_form_draws_each_state_until_done() {
        let mut term = Recorder {
            keys: VecDeque::from([Key::Char('x'), Key::Char('y')]),
            ..Recorder::default()
        };
        let answer = run_form(&mut term, ConfirmForm::new("continue?")).unwrap();
        assert_eq!(answer, Some(true));
        assert_eq!(term.frames.len(), 2);
        assert_eq!((term.entered, term.left), (1, 1));
    }

    #[test]
    fn run_form_leaves_terminal_on_error() {
        let mut term = Recorder::default();
        assert!(run_form(&mut term, ConfirmForm::new("continue?")).is_err());
        assert_eq!((term.entered, term.left), (1, 1));
    }

    #[test]
    fn decodes_control_keys() {
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        assert_eq!(decode(ctrl('c')), Some(Key::Interrupt));
        assert_eq!(decode(ctrl('d')), Some(Key::Finish));
        assert_eq!(decode(ctrl('x')), None);
    }

    #[test]
    fn decodes_plain_keys() {
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(decode(plain(KeyCode::Char('a'))), Some(Key::Char('a')));
        assert_eq!(
            decode(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(Key::Char('A'))
        );
        assert_eq!(decode(plain(KeyCode::Enter)), Some(Key::Enter));
        assert_eq!(decode(plain(KeyCode::Esc)), Some(Key::Esc));
        assert_eq!(decode(plain(KeyCode::Backspace)), Some(Key::Backspace));
        assert_eq!(decode(plain(KeyCode::Up)), Some(Key::Up));
        assert_eq!(decode(plain(KeyCode::Down)), Some(Key::Down));
        assert_eq!(decode(plain(KeyCode::Tab)), None);
    }

    #[test]
    fn rows_account_for_wrapping() {
        assert_eq!(line_rows("", 60), 1);
        assert_eq!(line_rows(&"x".repeat(60), 60), 1);
        assert_eq!(line_rows(&"x".repeat(80), 60), 2);
        assert_eq!(line_rows(&"x".repeat(121), 60), 3);
        // wide characters take two columns each
        assert_eq!(line_rows(&"修".repeat(40), 60), 2);
    }

    #[test]
    fn colour_codes_take_no_columns() {
        assert_eq!(visible_width("\u{1b}[1;35mheading\u{1b}[0m"), 7);
        assert_eq!(visible_width("plain"), 5);
    }

    #[test]
    fn frame_rows_include_wrapped_lines() {
        let frame = format!("title\n{}\nfooter", "p".repeat(80));
        let (lines, used) = fit_frame(&frame, 60, 24);
        assert_eq!(lines.len(), 3);
        assert_eq!(used, 4);
    }

    #[test]
    fn tall_frames_are_cut_to_the_screen() {
        let frame: String = (0..30).map(|i| format!("line {i}\n")).collect();
        let (lines, used) = fit_frame(&frame, 80, 10);
        assert_eq!(used, 10);
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "line 0");
        assert_eq!(lines[8], "line 8");
        assert!(lines[9].contains("21 more lines"));

        // frames that fit are untouched
        let (lines, used) = fit_frame("a\nb", 80, 10);
        assert_eq!((lines, used), (vec!["a".to_string(), "b".to_string()], 2));
    }
}
