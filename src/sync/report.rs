use std::io::{self, Write};

use colored::Colorize;

use super::engine::{Action, BranchOutcome, Outcome, Warning};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Something changed; goes to stdout.
    Out(String),
    /// Something needs the user's attention; goes to stderr.
    Err(String),
}

pub fn render(outcome: &BranchOutcome) -> Option<Line> {
    let branch = outcome.branch.as_str();

    match &outcome.outcome {
        Outcome::Skipped => None,
        Outcome::Applied(Action::Updated { old_tip }) => Some(Line::Out(format!(
            "{} {} (was {}).",
            "Updated branch".green(),
            branch.green().bold(),
            old_tip
        ))),
        Outcome::Applied(Action::Deleted { old_tip, reason }) => Some(Line::Out(format!(
            "{} {} (was {}).",
            format!("Deleted {} branch", reason).red(),
            branch.red().bold(),
            old_tip
        ))),
        Outcome::Warned(Warning::Unpushed) => Some(Line::Err(format!(
            "warning: '{}' seems to contain unpushed commits",
            branch
        ))),
        Outcome::Warned(Warning::Unmerged {
            remote,
            default_branch,
        }) => Some(Line::Err(format!(
            "warning: '{}' was deleted on {}, but appears not merged into '{}'",
            branch, remote, default_branch
        ))),
        Outcome::Warned(Warning::Failed { message }) => Some(Line::Err(format!(
            "warning: '{}' was left untouched: {}",
            branch, message
        ))),
    }
}

pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl Reporter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn report(&mut self, outcome: &BranchOutcome) -> io::Result<()> {
        match render(outcome) {
            Some(Line::Out(line)) => writeln!(self.out, "{}", line),
            Some(Line::Err(line)) => writeln!(self.err, "{}", line),
            None => Ok(()),
        }
    }

    pub fn report_all(&mut self, outcomes: &[BranchOutcome]) -> io::Result<()> {
        for outcome in outcomes {
            self.report(outcome)?;
        }
        self.out.flush()?;
        self.err.flush()
    }
}
