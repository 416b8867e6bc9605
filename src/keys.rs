use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::error::{Result, SearchError};

const STDIN_NAME: &str = "-";

/// Reads keys from every input in order, or from stdin when there are none.
///
/// `-` stands for stdin. Each line is one key with surrounding whitespace
/// trimmed; blank lines are kept as empty keys.
pub fn read_keys(inputs: &[String]) -> Result<Vec<String>> {
    let mut keys = Vec::new();

    if inputs.is_empty() {
        read_stdin(&mut keys)?;
        return Ok(keys);
    }

    for input in inputs {
        if input == STDIN_NAME {
            read_stdin(&mut keys)?;
        } else {
            let path = Path::new(input);
            let file = File::open(path).map_err(|err| SearchError::io(path, err))?;
            read_lines(BufReader::new(file), path, &mut keys)?;
        }
    }

    Ok(keys)
}

fn read_stdin(keys: &mut Vec<String>) -> Result<()> {
    read_lines(io::stdin().lock(), Path::new("<stdin>"), keys)
}

/// Appends one trimmed key per line of `reader` to `keys`.
pub fn read_lines<R: BufRead>(reader: R, path: &Path, keys: &mut Vec<String>) -> Result<()> {
    for line in reader.lines() {
        let line = line.map_err(|err| SearchError::io(path, err))?;
        keys.push(line.trim().to_string());
    }
    Ok(())
}
