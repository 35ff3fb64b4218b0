use std::io::{self, Write};

/// Output sink for retained CSS.
///
/// Declarations are separated by `;`, written lazily before whatever comes
/// next, so the last declaration of a block is closed by `}` alone.
pub struct Emitter<W: Write> {
    out: W,
    separator: bool,
    written: u64,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            separator: false,
            written: 0,
        }
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.write_bytes(text.as_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.separator {
            self.separator = false;
            self.raw(b";")?;
        }
        self.raw(bytes)
    }

    /// `property:value...`, values concatenated as given
    pub fn declaration(&mut self, property: &str, values: &[&str]) -> io::Result<()> {
        self.write(property)?;
        self.raw(b":")?;
        for value in values {
            self.raw(value.as_bytes())?;
        }
        self.separator = true;
        Ok(())
    }

    /// Close a block, dropping a pending separator
    pub fn close(&mut self) -> io::Result<()> {
        self.separator = false;
        self.raw(b"}")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Bytes written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emitted(f: impl FnOnce(&mut Emitter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut emitter = Emitter::new(Vec::new());
        f(&mut emitter).unwrap();
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    #[test]
    fn test_separator_elided_before_close() {
        let out = emitted(|e| {
            e.write("a{")?;
            e.declaration("color", &["red"])?;
            e.declaration("margin", &["0", " ", "auto"])?;
            e.close()
        });
        assert_eq!(out, "a{color:red;margin:0 auto}");
    }

    #[test]
    fn test_separator_before_raw_text() {
        let out = emitted(|e| {
            e.declaration("color", &["red"])?;
            e.write("/*! x */")
        });
        assert_eq!(out, "color:red;/*! x */");
    }

    #[test]
    fn test_written_counts_bytes() {
        let mut emitter = Emitter::new(Vec::new());
        emitter.write("a{").unwrap();
        emitter.declaration("b", &["c"]).unwrap();
        emitter.close().unwrap();
        assert_eq!(emitter.written(), 6);
        assert_eq!(emitter.into_inner(), b"a{b:c}");
    }
}
