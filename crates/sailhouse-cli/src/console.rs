use std::io::{self, BufRead, BufReader, Stdin, Write};

use colored::Colorize;
use sailhouse_schema::{ApplyConsole, Change, ChangeKind, EntityType};

use crate::cli::OutputFormat;
use crate::output::{change_line, slug_width};

/// Plan display and confirmation on the terminal.
pub struct TerminalConsole<R, W> {
    input: R,
    out: W,
}

impl TerminalConsole<BufReader<Stdin>, Box<dyn Write + Send>> {
    /// Reads answers from stdin. Progress goes to stderr when stdout carries
    /// JSON or YAML.
    pub fn stdio(format: OutputFormat) -> Self {
        let out: Box<dyn Write + Send> = match format {
            OutputFormat::Text => Box::new(io::stdout()),
            OutputFormat::Json | OutputFormat::Yaml => Box::new(io::stderr()),
        };
        Self::new(BufReader::new(io::stdin()), out)
    }
}

impl<R: BufRead + Send, W: Write + Send> TerminalConsole<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }
}

impl<R: BufRead + Send, W: Write + Send> ApplyConsole for TerminalConsole<R, W> {
    fn show_plan(&mut self, changes: &[Change]) {
        let width = slug_width(changes);
        let _ = writeln!(self.out, "{}", "Changes:".bold());
        for change in changes {
            let _ = writeln!(self.out, "  {}", change_line(change, width));
        }
        let _ = writeln!(self.out);
    }

    fn show_no_changes(&mut self) {
        let _ = writeln!(self.out, "{} No changes to apply", "✓".green());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        let _ = write!(self.out, "{prompt} [y/N] ");
        let _ = self.out.flush();
        let mut answer = String::new();
        if self.input.read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn applying(&mut self, step: usize, total: usize, change: &Change) {
        let verb = match change.kind {
            ChangeKind::Create => "Creating",
            ChangeKind::Delete => "Deleting",
        };
        let entity = match change.entity {
            EntityType::Topic => "topic",
            EntityType::Subscription => "subscription",
        };
        let _ = writeln!(
            self.out,
            "[{step}/{total}] {verb} {entity} {}",
            change.slug.cyan()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> TerminalConsole<Cursor<Vec<u8>>, Vec<u8>> {
        colored::control::set_override(false);
        TerminalConsole::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_confirm_answers() {
        assert!(console("y\n").confirm("Apply changes?"));
        assert!(console("YES\n").confirm("Apply changes?"));
        assert!(!console("n\n").confirm("Apply changes?"));
        assert!(!console("\n").confirm("Apply changes?"));
        assert!(!console("").confirm("Apply changes?"));
    }

    #[test]
    fn test_plan_and_progress_output() {
        let mut console = console("");
        let changes = vec![
            Change::create(EntityType::Topic, "b"),
            Change::delete(EntityType::Subscription, "s2"),
        ];
        console.show_plan(&changes);
        console.applying(2, 2, &changes[1]);

        let text = String::from_utf8(console.into_output()).unwrap();
        assert!(text.contains("  Topic        b  CREATE"));
        assert!(text.contains("  Subscription s2 DELETE"));
        assert!(text.contains("[2/2] Deleting subscription s2"));
    }
}
