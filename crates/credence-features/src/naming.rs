//! Placeholder substitution for generated feature names.
//!
//! Encoders describe their outputs with placeholders standing for their
//! input columns (`x0_M`, `x1`). These helpers swap the placeholders for the
//! step's real column names.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `x<digits>` at the start of the name or after a non-alphanumeric byte.
/// The digit run is greedy, so `x10` is index 10 and never `x1` + `0`.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^A-Za-z0-9])x([0-9]+)").expect("placeholder pattern is valid")
});

/// Replace every placeholder in `name` with the matching entry of `columns`.
///
/// Placeholders whose index falls outside `columns` are left as they are.
pub fn replace_placeholders<S: AsRef<str>>(name: &str, columns: &[S]) -> String {
    PLACEHOLDER
        .replace_all(name, |caps: &Captures| {
            let index = caps[2].parse::<usize>().ok();
            match index.and_then(|i| columns.get(i)) {
                Some(column) => format!("{}{}", &caps[1], column.as_ref()),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Apply [`replace_placeholders`] to every generated name.
pub fn substitute_all<S: AsRef<str>>(generated: &[String], columns: &[S]) -> Vec<String> {
    generated
        .iter()
        .map(|name| replace_placeholders(name, columns))
        .collect()
}
