//! Confirmation gate
//!
//! Nothing executes until the operator says yes. Anything other than `y`
//! counts as a no.

use std::io;

use crate::operator::Operator;
use crate::state::ActionCall;

pub trait ConfirmationGate: Send {
    fn confirm(&mut self, operator: &mut dyn Operator, call: &ActionCall) -> io::Result<bool>;
}

/// Asks `[y/n] continue with: <action>?` on the operator's terminal
#[derive(Debug, Default)]
pub struct PromptGate;

impl ConfirmationGate for PromptGate {
    fn confirm(&mut self, operator: &mut dyn Operator, call: &ActionCall) -> io::Result<bool> {
        let answer = operator.ask(&format!("[y/n] continue with: {}?", call))?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::test_support::ScriptedOperator;

    fn call() -> ActionCall {
        ActionCall {
            kind: ActionKind::Model,
            call_id: "call_1".to_string(),
        }
    }

    #[test]
    fn test_only_y_accepts() {
        assert!(is_yes("y"));
        assert!(is_yes(" Y\n"));
        assert!(!is_yes("yes"));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }

    #[test]
    fn test_prompt_mentions_action() {
        let mut operator = ScriptedOperator::new(["y"]);
        assert!(PromptGate.confirm(&mut operator, &call()).unwrap());
        assert_eq!(operator.prompts(), ["[y/n] continue with: Model (call_1)?"]);
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut operator = ScriptedOperator::new(Vec::<String>::new());
        let err = PromptGate.confirm(&mut operator, &call()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
