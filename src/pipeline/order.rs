//! Natural (numeric-aware) filename ordering.
//!
//! Plain lexical order puts `shot10.png` before `shot2.png`, which is never
//! what a human who numbered their screenshots meant. The comparator here
//! treats each maximal digit run as one number, so embedded counters sort by
//! value while everything else sorts byte-wise. Ties between numerically
//! equal runs (`2` vs `002`) break on the raw run length so the order stays
//! total and deterministic.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

/// Compare two strings treating digit runs as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ia = a.chars().peekable();
    let mut ib = b.chars().peekable();

    loop {
        match (ia.peek().copied(), ib.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let ra = take_digit_run(&mut ia);
                    let rb = take_digit_run(&mut ib);
                    let ord = cmp_digit_runs(&ra, &rb);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                } else {
                    let ord = ca.cmp(&cb);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    ia.next();
                    ib.next();
                }
            }
        }
    }
}

/// Sort paths in place by the natural order of their file names.
pub fn sort_naturally(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_cmp(&file_name_of(a), &file_name_of(b)));
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn take_digit_run(it: &mut Peekable<Chars>) -> String {
    let mut run = String::new();
    while let Some(&c) = it.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        it.next();
    }
    run
}

/// Numeric comparison of two digit runs without parsing into an integer,
/// so arbitrarily long runs cannot overflow.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let ta = a.trim_start_matches('0');
    let tb = b.trim_start_matches('0');
    // More significant digits wins; equal length falls back to lexical
    // (which is numeric for equal-length runs); numerically equal runs
    // order by raw length so "2" and "002" stay distinct.
    ta.len()
        .cmp(&tb.len())
        .then_with(|| ta.cmp(tb))
        .then_with(|| a.len().cmp(&b.len()))
}
