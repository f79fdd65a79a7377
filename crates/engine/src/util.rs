//! Internal helpers shared by the aggregation ops.
//!
//! These utilities are **not** part of the public API.

use std::cmp::Ordering;

/// Natural, case-insensitive ordering: letters compare case-folded and digit
/// runs compare by numeric value, so `giorno 2` sorts before `Giorno 10`.
///
/// Used for category keys, participant rows and known currency codes.
pub(crate) fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut l = left.chars().peekable();
    let mut r = right.chars().peekable();

    loop {
        match (l.peek().copied(), r.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) => {
                if lc.is_ascii_digit() && rc.is_ascii_digit() {
                    let ln = take_number(&mut l);
                    let rn = take_number(&mut r);
                    match ln.cmp(&rn) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    let lf = lc.to_lowercase().next().unwrap_or(lc);
                    let rf = rc.to_lowercase().next().unwrap_or(rc);
                    match lf.cmp(&rf) {
                        Ordering::Equal => {
                            l.next();
                            r.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut value: u64 = 0;
    while let Some(ch) = chars.peek().copied() {
        let Some(digit) = ch.to_digit(10) else { break };
        value = value.saturating_mul(10).saturating_add(u64::from(digit));
        chars.next();
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive() {
        assert_eq!(natural_cmp("alice", "Alice"), Ordering::Equal);
        assert_eq!(natural_cmp("bob", "Alice"), Ordering::Greater);
    }

    #[test]
    fn digit_runs_compare_numerically() {
        assert_eq!(natural_cmp("giorno 2", "Giorno 10"), Ordering::Less);
        assert_eq!(natural_cmp("day 10", "day 9"), Ordering::Greater);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(natural_cmp("an", "anna"), Ordering::Less);
    }
}
