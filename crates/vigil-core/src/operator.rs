//! The human at the keyboard
//!
//! Both the confirmation gate and the actions' questionnaires talk to the
//! operator through this trait, so tests can script the whole conversation.

use std::io;

pub trait Operator: Send {
    /// Show a line of output
    fn say(&mut self, line: &str);

    /// Show a prompt and block until the operator answers.
    ///
    /// Closed input must surface as `io::ErrorKind::UnexpectedEof` so that
    /// re-prompting loops terminate.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;
}
