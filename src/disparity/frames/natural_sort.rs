use std::cmp::Ordering;

/// Natural ("human") ordering of file names.
///
/// Both strings are walked in lock step. A position where exactly one side
/// starts with a digit sorts that side first. Non-digit characters compare
/// ASCII case-insensitively, one at a time. Digit runs compare by numeric
/// value; on equal values the walk continues after both runs.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a;
    let mut b = b;

    loop {
        let (ca, cb) = match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => (ca, cb),
        };

        match (ca.is_ascii_digit(), cb.is_ascii_digit()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {
                let ord = ca.to_ascii_uppercase().cmp(&cb.to_ascii_uppercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                a = &a[ca.len_utf8()..];
                b = &b[cb.len_utf8()..];
            }
            (true, true) => {
                let (run_a, rest_a) = split_digit_run(a);
                let (run_b, rest_b) = split_digit_run(b);
                let ord = cmp_numeric(run_a, run_b);
                if ord != Ordering::Equal {
                    return ord;
                }
                a = rest_a;
                b = rest_b;
            }
        }
    }
}

/// Sorts names in place with `natural_cmp`.
pub fn natural_sort<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

fn split_digit_run(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s.split_at(end)
}

// Arbitrary-length comparison: no integer parsing, so long runs cannot overflow
fn cmp_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
