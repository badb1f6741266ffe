use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

/// A literal chunk of pixelscript source, plus a name for error messages.
///
/// Mirrors passerine's `common::source::Source`: a source is a reference to
/// some code, with an associated name telling which file it came from.
#[derive(Debug, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub contents: String,
}

impl Source {
    /// Wraps a string of source that didn't come from a file.
    pub fn inline(contents: impl Into<String>) -> Rc<Source> {
        Rc::new(Source { name: "<inline>".to_string(), contents: contents.into() })
    }

    /// Reads a program from disk.
    pub fn read(path: &Path) -> io::Result<Rc<Source>> {
        let contents = fs::read_to_string(path)?;
        Ok(Rc::new(Source { name: path.display().to_string(), contents }))
    }

    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Rc<Source> {
        Rc::new(Source { name: name.into(), contents: contents.into() })
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
