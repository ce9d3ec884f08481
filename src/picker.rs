// src/picker.rs
use std::io::{BufRead, Write};

use crate::discovery::FieldCandidates;
use crate::error::Result;
use crate::selection::FieldSelection;

/// Lets a human turn discovered candidates into an ordered selection.
///
/// An empty selection means "abort, do nothing".
pub trait FieldPicker {
    fn pick(&mut self, candidates: &FieldCandidates) -> Result<FieldSelection>;
}

/// Line-oriented picker: lists numbered candidates and reads one answer line.
pub struct PromptPicker<R, W> {
    input: R,
    prompt: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub fn new(input: R, prompt: W) -> Self {
        Self { input, prompt }
    }

    fn show(&mut self, candidates: &FieldCandidates) -> Result<()> {
        let width = candidates.len().to_string().len();
        for (i, name) in candidates.iter().enumerate() {
            writeln!(self.prompt, "  {:>width$}) {}", i + 1, name, width = width)?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> FieldPicker for PromptPicker<R, W> {
    fn pick(&mut self, candidates: &FieldCandidates) -> Result<FieldSelection> {
        self.show(candidates)?;
        loop {
            write!(
                self.prompt,
                "Fields to output (numbers or names, in order; empty line aborts): "
            )?;
            self.prompt.flush()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                writeln!(self.prompt)?;
                return Ok(FieldSelection::default());
            }
            match parse_answer(&answer, candidates) {
                Ok(selection) => return Ok(selection),
                Err(message) => writeln!(self.prompt, "{}", message)?,
            }
        }
    }
}

/// Resolve an answer like `3, srcip 1` against the candidate list.
///
/// Numbers are 1-based positions; anything else must be a candidate name.
/// Order and repeats are kept.
pub fn parse_answer(
    answer: &str,
    candidates: &FieldCandidates,
) -> std::result::Result<FieldSelection, String> {
    let mut names = Vec::new();
    for token in answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let name = match token.parse::<usize>() {
            Ok(n) => n
                .checked_sub(1)
                .and_then(|i| candidates.get(i))
                .ok_or_else(|| format!("no field number {}", n))?,
            Err(_) if candidates.contains(token) => token,
            Err(_) => return Err(format!("unknown field '{}'", token)),
        };
        names.push(name.to_string());
    }
    Ok(FieldSelection::new(names))
}
