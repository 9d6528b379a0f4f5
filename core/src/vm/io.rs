use std::io::{self, BufRead};

/// Line-oriented program input consumed by `READ`.
///
/// `Ok(None)` means the input is exhausted.
pub trait InputSource {
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

impl<T: BufRead> InputSource for T {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if BufRead::read_line(self, &mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}
