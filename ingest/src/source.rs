//! Line sources. Both drain their input completely before anything is parsed.

use std::{fs::File, io::Read, path::Path};

use log::debug;

use crate::Result;

/// Reads every line of the file at `path`.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    debug!("reading lines from {}", path.display());
    drain(File::open(path)?)
}

/// Reads `reader` until it is exhausted and splits what was read into lines.
///
/// Bytes that are not valid UTF-8, which a noisy serial link may produce, are
/// replaced instead of failing the read so the parser can recover the frame.
pub fn drain<R: Read>(mut reader: R) -> Result<Vec<String>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let text = String::from_utf8_lossy(&bytes);
    Ok(text.lines().map(str::to_owned).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_splits_on_any_line_terminator() {
        let lines = drain("a\r\nb\n\nc".as_bytes()).unwrap();
        assert_eq!(lines, ["a", "b", "", "c"]);
    }

    #[test]
    fn drain_survives_invalid_utf8() {
        let bytes: &[u8] = &[0xff, 0xfe, b'[', b'{', b'}', b']', b'\n', b'x'];
        let lines = drain(bytes).unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[{}]"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_file("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, crate::ParseErr::Io(_)));
    }
}
