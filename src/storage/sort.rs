//! Natural ordering of filenames
//!
//! Runs of ASCII digits compare by numeric value, everything else compares
//! by Unicode lowercase mapping. No locale collation is applied. Names that
//! compare equal under these rules fall back to a plain byte comparison so
//! the order is total and stable across calls.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Sort names in natural, case-insensitive order.
pub fn sort_naturally(names: &mut [String]) {
    names.sort_by(|a, b| natural_cmp(a, b));
}

/// Compare two names in natural, case-insensitive order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                match compare_numeric(&l_run, &r_run) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                match l.to_lowercase().cmp(r.to_lowercase()) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

/// Compares digit runs of arbitrary length without overflowing.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
