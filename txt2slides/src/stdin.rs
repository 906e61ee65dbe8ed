use std::io::{self, BufReader, Read};

/// Reads everything from `reader` until end of stream.
pub fn read_all<R: Read>(reader: R) -> io::Result<String> {
    let mut buf = String::new();
    BufReader::new(reader).read_to_string(&mut buf)?;
    Ok(buf)
}

/// Reads all of standard input.
pub fn read_stdin() -> io::Result<String> {
    read_all(io::stdin().lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        let buf = read_all("".as_bytes()).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn single_char() {
        assert_eq!(read_all("a".as_bytes()).unwrap(), "a");
    }

    #[test]
    fn reads_till_end_of_stream() {
        let buf = read_all("first lin\nsecond line".as_bytes()).unwrap();
        assert_eq!(buf, "first lin\nsecond line");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let err = read_all(&[0xff, 0xfe][..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
