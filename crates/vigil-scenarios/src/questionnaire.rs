//! Numbered multiple-choice prompts
//!
//! Invalid input re-prompts; closed input ends the questionnaire with the
//! operator's `UnexpectedEof`.

use std::io;

use vigil_core::Operator;

/// Show `question` with numbered options and return the chosen index
/// (zero-based).
pub fn choose<S: AsRef<str>>(
    operator: &mut dyn Operator,
    question: &str,
    options: &[S],
) -> io::Result<usize> {
    if options.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no options for '{}'", question),
        ));
    }

    operator.say(question);
    for (i, option) in options.iter().enumerate() {
        operator.say(&format!("{}. {}", i + 1, option.as_ref()));
    }

    loop {
        let answer = operator.ask("Select your option (number): ")?;
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
            Ok(_) => operator.say(&format!(
                "Please select a valid option number between 1 and {}.",
                options.len()
            )),
            Err(_) => operator.say("Please enter a number."),
        }
    }
}

/// Like `choose`, but accepts several comma-separated numbers.
/// Indices come back in the order typed, duplicates dropped.
pub fn choose_many<S: AsRef<str>>(
    operator: &mut dyn Operator,
    question: &str,
    options: &[S],
) -> io::Result<Vec<usize>> {
    if options.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no options for '{}'", question),
        ));
    }

    operator.say(question);
    for (i, option) in options.iter().enumerate() {
        operator.say(&format!("{}. {}", i + 1, option.as_ref()));
    }

    loop {
        let answer = operator.ask("Enter the numbers corresponding to your choices, separated by commas: ")?;
        match parse_many(&answer, options.len()) {
            Some(indices) => return Ok(indices),
            None => operator.say(&format!(
                "Please enter numbers between 1 and {} separated by commas.",
                options.len()
            )),
        }
    }
}

fn parse_many(answer: &str, len: usize) -> Option<Vec<usize>> {
    let mut indices = Vec::new();
    for part in answer.split(',') {
        let n: usize = part.trim().parse().ok()?;
        if !(1..=len).contains(&n) {
            return None;
        }
        if !indices.contains(&(n - 1)) {
            indices.push(n - 1);
        }
    }
    if indices.is_empty() {
        None
    } else {
        Some(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::test_support::ScriptedOperator;

    const OPTIONS: [&str; 3] = ["Yes", "No", "Maybe"];

    #[test]
    fn test_choose_reprompts_until_valid() {
        let mut op = ScriptedOperator::new(["abc", "7", "0", " 2 "]);
        assert_eq!(choose(&mut op, "Is it?", &OPTIONS).unwrap(), 1);
        assert_eq!(op.prompts().len(), 4);
        assert_eq!(op.output()[0], "Is it?");
        assert_eq!(op.output()[1], "1. Yes");
        assert!(op.output().iter().any(|l| l == "Please enter a number."));
    }

    #[test]
    fn test_choose_eof() {
        let mut op = ScriptedOperator::new(["x"]);
        let err = choose(&mut op, "Is it?", &OPTIONS).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_choose_without_options() {
        let mut op = ScriptedOperator::new(["1"]);
        let empty: [&str; 0] = [];
        let err = choose(&mut op, "Pick", &empty).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(op.remaining(), 1);
    }

    #[test]
    fn test_choose_many() {
        let mut op = ScriptedOperator::new(["1,4", "3, 1,3"]);
        assert_eq!(choose_many(&mut op, "Pick", &OPTIONS).unwrap(), vec![2, 0]);
        assert_eq!(op.prompts().len(), 2);
    }

    #[test]
    fn test_parse_many_rejects_blanks() {
        assert_eq!(parse_many("", 3), None);
        assert_eq!(parse_many("1,,2", 3), None);
        assert_eq!(parse_many("2", 3), Some(vec![1]));
    }
}
