//! Rewriting the shorthand people type (`5x^2`) into something the parser
//! understands (`5*x**2`).

/// Turn `^` into `**` and make implicit multiplication between a digit and a
/// letter explicit.
///
/// The rewrite is purely textual so it knows nothing about words, which means
/// `sin2x` becomes `sin*2*x`.
pub fn normalize(equation: &str) -> String {
    let powers = equation.replace('^', "**");
    let digit_then_letter = insert_times(&powers, |left, right| {
        left.is_ascii_digit() && right.is_ascii_alphabetic()
    });

    insert_times(&digit_then_letter, |left, right| {
        left.is_ascii_alphabetic() && right.is_ascii_digit()
    })
}

/// Insert a `*` between every pair of adjacent characters matching
/// `needs_times`.
fn insert_times<F>(text: &str, needs_times: F) -> String
where
    F: Fn(char, char) -> bool,
{
    let mut normalized = String::with_capacity(text.len());
    let mut previous = None;

    for c in text.chars() {
        if let Some(previous) = previous {
            if needs_times(previous, c) {
                normalized.push('*');
            }
        }
        normalized.push(c);
        previous = Some(c);
    }

    normalized
}
