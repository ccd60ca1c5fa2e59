//! Terminal rendering for criteria and comparison views
//!
//! Every printer has a `_to` form taking a writer so output can be tested.

use crate::model::Criterion;
use crate::session::{CalibrationRow, Comparison, ProgressRow};
use dialoguer::console::style;
use std::io::{self, Write};

const RULE_WIDTH: usize = 60;

pub fn print_header(title: &str) -> io::Result<()> {
    print_header_to(&mut io::stdout(), title)
}

pub fn print_header_to<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    let border = "─".repeat(RULE_WIDTH);
    writeln!(w, "┌{}┐", border)?;
    writeln!(w, "│ {:<width$} │", title, width = RULE_WIDTH - 2)?;
    writeln!(w, "└{}┘", border)?;
    writeln!(w)
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

pub fn print_criteria_to<W: Write>(w: &mut W, criteria: &[Criterion]) -> io::Result<()> {
    writeln!(w, "Your draft will be rated on:")?;
    for (i, criterion) in criteria.iter().enumerate() {
        writeln!(
            w,
            "  {}. {} ({}-{})",
            i + 1,
            criterion.description,
            criterion.scale.min,
            criterion.scale.max
        )?;
    }
    writeln!(w)
}

pub fn print_comparison(comparison: &Comparison) -> io::Result<()> {
    print_comparison_to(&mut io::stdout(), comparison)
}

pub fn print_comparison_to<W: Write>(w: &mut W, comparison: &Comparison) -> io::Result<()> {
    match comparison {
        Comparison::Calibration {
            iteration_id,
            self_average,
            ai_average,
            rows,
            quality_flags,
        } => {
            writeln!(w, "Draft {} - how your read compares", iteration_id)?;
            writeln!(
                w,
                "  You: {:.1}   Coach: {:.1}",
                self_average, ai_average
            )?;
            writeln!(w)?;
            for row in rows {
                write_calibration_row(w, row)?;
            }
            write_flags(w, quality_flags)
        }
        Comparison::Progress {
            iteration_id,
            ai_average,
            average_delta,
            rows,
            quality_flags,
        } => {
            match average_delta {
                Some(delta) => writeln!(
                    w,
                    "Draft {} - coach average {:.1} ({})",
                    iteration_id,
                    ai_average,
                    signed_f64(*delta)
                )?,
                None => writeln!(w, "Draft {} - coach average {:.1}", iteration_id, ai_average)?,
            }
            writeln!(w)?;
            for row in rows {
                write_progress_row(w, row)?;
            }
            write_flags(w, quality_flags)
        }
    }
}

fn write_calibration_row<W: Write>(w: &mut W, row: &CalibrationRow) -> io::Result<()> {
    writeln!(
        w,
        "  {}\n    you {}  coach {}  ({})",
        row.description,
        row.self_score,
        row.ai_score,
        signed(row.delta)
    )?;
    write_details(w, row.reasoning.as_deref(), row.suggestion.as_deref(), row.note.as_deref())
}

fn write_progress_row<W: Write>(w: &mut W, row: &ProgressRow) -> io::Result<()> {
    match (row.previous_score, row.delta) {
        (Some(previous), Some(delta)) => writeln!(
            w,
            "  {}\n    coach {} (was {}, {})",
            row.description,
            row.ai_score,
            previous,
            signed(delta)
        )?,
        _ => writeln!(w, "  {}\n    coach {}", row.description, row.ai_score)?,
    }
    write_details(w, row.reasoning.as_deref(), row.suggestion.as_deref(), row.note.as_deref())
}

fn write_details<W: Write>(
    w: &mut W,
    reasoning: Option<&str>,
    suggestion: Option<&str>,
    note: Option<&str>,
) -> io::Result<()> {
    if let Some(reasoning) = reasoning {
        writeln!(w, "    {}", reasoning)?;
    }
    if let Some(suggestion) = suggestion {
        writeln!(w, "    Try: {}", suggestion)?;
    }
    if let Some(note) = note {
        writeln!(w, "    Your note: {}", note)?;
    }
    writeln!(w)
}

fn write_flags<W: Write>(w: &mut W, flags: &[String]) -> io::Result<()> {
    if flags.is_empty() {
        return Ok(());
    }
    writeln!(w, "Heads up:")?;
    for flag in flags {
        writeln!(w, "  - {}", flag)?;
    }
    writeln!(w)
}

fn signed(delta: i32) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

fn signed_f64(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{delta:.1}")
    } else {
        format!("{delta:.1}")
    }
}
