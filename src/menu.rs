//! Console menu used to pick the interpolation method.
use std::io::{BufRead, Write};

use crate::interpolation::InterpolationKind;

/// Menu entries, keyed by the number the user types. Only the first
/// [`LISTED_CHOICES`] are shown in the prompt, but all are accepted.
pub const MENU: [(&str, InterpolationKind); 11] = [
    ("1", InterpolationKind::Linear),
    ("2", InterpolationKind::Nearest),
    ("3", InterpolationKind::Cubic),
    ("4", InterpolationKind::Quadratic),
    ("5", InterpolationKind::Slinear),
    ("6", InterpolationKind::Polynomial),
    ("7", InterpolationKind::Spline),
    ("8", InterpolationKind::Pchip),
    ("9", InterpolationKind::Akima),
    ("10", InterpolationKind::Cubicspline),
    ("11", InterpolationKind::FromDerivatives),
];

pub const LISTED_CHOICES: usize = 6;

pub const INVALID_CHOICE_MSG: &str = "Invalid interpolation method. Exiting...";

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("Could not read the menu choice")]
    Io(#[from] std::io::Error),
    #[error("Invalid interpolation method (got '{0}')")]
    InvalidChoice(String),
}

/// Map a menu answer (surrounding whitespace ignored) to its method.
pub fn method_for_choice(choice: &str) -> Option<InterpolationKind> {
    let choice = choice.trim();
    MENU.iter()
        .find(|(key, _)| *key == choice)
        .map(|(_, kind)| *kind)
}

/// The text shown when asking for the method.
pub fn prompt_text() -> String {
    let mut text = "Choose an interpolation method from the following options:\n".to_string();
    for (key, kind) in MENU.iter().take(LISTED_CHOICES) {
        text.push_str(&format!("{key}. {kind}\n"));
    }
    text.push_str("Enter the number corresponding to the desired method: ");
    text
}

/// Show the menu on `output`, read one line from `input`, and return the chosen method.
///
/// An unrecognized answer, including an empty line or end of input, gives
/// [`MenuError::InvalidChoice`].
pub fn prompt_method<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<InterpolationKind, MenuError> {
    write!(output, "{}", prompt_text())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    method_for_choice(&line).ok_or_else(|| MenuError::InvalidChoice(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", InterpolationKind::Linear)]
    #[case("2\n", InterpolationKind::Nearest)]
    #[case(" 6 ", InterpolationKind::Polynomial)]
    #[case("7", InterpolationKind::Spline)]
    #[case("11", InterpolationKind::FromDerivatives)]
    fn test_valid_choices(#[case] answer: &str, #[case] expected: InterpolationKind) {
        assert_eq!(method_for_choice(answer), Some(expected));
    }

    #[rstest]
    #[case("0")]
    #[case("12")]
    #[case("linear")]
    #[case("")]
    #[case("1.0")]
    fn test_invalid_choices(#[case] answer: &str) {
        assert_eq!(method_for_choice(answer), None);
    }

    #[test]
    fn test_prompt_lists_first_six() {
        let text = prompt_text();
        assert!(text.contains("1. linear\n"));
        assert!(text.contains("6. polynomial\n"));
        assert!(!text.contains("7. spline"));
        assert!(text.ends_with("Enter the number corresponding to the desired method: "));
    }

    #[test]
    fn test_prompt_method() {
        let mut input = "3\n".as_bytes();
        let mut output = Vec::new();
        let kind = prompt_method(&mut input, &mut output).unwrap();
        assert_eq!(kind, InterpolationKind::Cubic);
        assert!(String::from_utf8(output).unwrap().starts_with("Choose an interpolation"));

        let mut input = "".as_bytes();
        let err = prompt_method(&mut input, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, MenuError::InvalidChoice(_)));
    }
}
