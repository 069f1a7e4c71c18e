//! Stdin/stdout operator

use std::io::{self, BufRead, Write};

use vigil_core::Operator;

pub struct ConsoleOperator<R> {
    input: R,
}

impl ConsoleOperator<io::BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> ConsoleOperator<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead + Send> Operator for ConsoleOperator<R> {
    fn say(&mut self, line: &str) {
        println!("{}", line);
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        print!("{} ", prompt.trim_end());
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_lines_then_eof() {
        let mut op = ConsoleOperator::new(Cursor::new("y\r\n2\n"));
        assert_eq!(op.ask("[y/n]?").unwrap(), "y");
        assert_eq!(op.ask("number:").unwrap(), "2");
        assert_eq!(op.ask("again:").unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }
}
