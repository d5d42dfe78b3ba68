use crate::pipeline::{Outcome, Verification};
use crate::timing::{Phase, PhaseTiming, Timings};
use std::fmt::Write;

/// Default width of a rendered element.
pub const CELL_WIDTH: usize = 3;

/// Fixed-width rendering of one vector element.
pub trait Cell {
    fn cell(&self, width: usize) -> String;
}

impl Cell for u64 {
    fn cell(&self, width: usize) -> String {
        format!("{:>width$}", self)
    }
}

impl Cell for f64 {
    fn cell(&self, width: usize) -> String {
        format!("{:>width$.4}", self)
    }
}

/// Renders the first head and last tail elements of values, right-aligned,
/// with an ellipsis in between. Short vectors are rendered whole.
pub fn render_vector<V: Cell>(values: &[V], head: usize, tail: usize, width: usize) -> String {
    let mut cells: Vec<String> = Vec::with_capacity(head + tail + 1);
    if values.len() <= head + tail {
        cells.extend(values.iter().map(|v| v.cell(width)));
    } else {
        cells.extend(values[..head].iter().map(|v| v.cell(width)));
        cells.push("...".to_string());
        cells.extend(values[values.len() - tail..].iter().map(|v| v.cell(width)));
    }
    let body: Vec<String> = cells.iter().map(|c| format!(" {c}")).collect();
    format!("    [{} ]", body.join(","))
}

/// One line per completed phase, in execution order.
pub fn render_timings(timings: &Timings) -> String {
    let mut out: String = String::from("Times:\n");
    Phase::ALL.iter().for_each(|phase| {
        if let Some(t) = timings.get(*phase) {
            out.push_str(&render_timing(t));
            out.push('\n');
        }
    });
    out
}

fn render_timing(timing: &PhaseTiming) -> String {
    format!("{:<22}: {:.6}", timing.phase.label(), timing.seconds())
}

pub fn render_verification(verification: &Verification) -> String {
    if verification.passed() {
        format!(
            "Verification: passed ({} values, max error {:e})",
            verification.checked, verification.max_error
        )
    } else {
        format!(
            "Verification: FAILED ({} of {} values differ, first at index {}, max error {:e})",
            verification.mismatches,
            verification.checked,
            verification
                .first_mismatch
                .map_or_else(|| "-".to_string(), |i| i.to_string()),
            verification.max_error
        )
    }
}

/// Full console report of a completed run.
pub fn render_outcome<V: Cell>(outcome: &Outcome<V>, head: usize, tail: usize) -> String {
    let mut out: String = String::new();
    let vector = |out: &mut String, title: &str, values: &[V]| {
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{}", render_vector(values, head, tail, CELL_WIDTH));
        out.push('\n');
    };

    let _ = writeln!(
        out,
        "Starting the velocity calculator with {} instances.\n",
        outcome.inputs.len()
    );
    vector(&mut out, "Acceleration:", &outcome.inputs.acceleration);
    vector(&mut out, "Initial Velocity:", &outcome.inputs.initial_velocity);
    vector(&mut out, "Time:", &outcome.inputs.time);
    vector(&mut out, "Final Velocity:", &outcome.output);
    outcome.rotated.iter().for_each(|r| {
        vector(&mut out, &format!("Rotated by {}:", r.steps), &r.values);
    });

    out.push_str(&render_timings(&outcome.timings));
    out.push('\n');
    out.push_str(&render_verification(&outcome.verification));
    out.push('\n');
    out
}
