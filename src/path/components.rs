//! Bidirectional cursor over the components of a path string.
//!
//! [`Components`] keeps a `[front, back)` window over the backing string and
//! never allocates a component list. Both ends of the window are kept
//! normalized after every step:
//!
//! - repeated separators collapse to one logical boundary (`a//b` is `a`, `b`)
//! - `.` segments are skipped, except a single leading one in a relative path
//! - trailing separators are ignored (`a/b/` is `a`, `b`)
//!
//! so the window always denotes a valid sub-path and never splits a component.

use std::fmt;

use super::Path;

/// Path separator used by every backend.
pub const SEPARATOR: char = '/';

const SEPARATOR_BYTE: u8 = b'/';

/// A single lexical component of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Component<'a> {
    /// The root of an absolute path (`/`). Only ever the first component.
    Root,
    /// A leading `.` of a relative path.
    CurDir,
    /// A `..` segment.
    ParentDir,
    /// Any other segment.
    Normal(&'a str),
}

impl<'a> Component<'a> {
    /// Classifies a single non-empty segment that contains no separator.
    fn from_segment(segment: &'a str) -> Self {
        match segment {
            "." => Component::CurDir,
            ".." => Component::ParentDir,
            other => Component::Normal(other),
        }
    }

    /// Returns the textual form of this component.
    pub fn as_str(&self) -> &'a str {
        match self {
            Component::Root => "/",
            Component::CurDir => ".",
            Component::ParentDir => "..",
            Component::Normal(text) => text,
        }
    }

    /// Returns true for [`Component::Normal`].
    pub fn is_normal(&self) -> bool {
        matches!(self, Component::Normal(_))
    }
}

impl fmt::Display for Component<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cursor over the components of a path, usable from both ends.
///
/// # Examples
///
/// ```
/// use resvfs::path::{Component, Components};
///
/// let mut iter = Components::new("/assets//lang/./en_us.json/");
/// assert_eq!(iter.peek(), Some(Component::Root));
/// assert_eq!(iter.peek_back(), Some(Component::Normal("en_us.json")));
///
/// iter.advance(1);
/// assert_eq!(iter.as_str(), "assets//lang/./en_us.json");
/// assert_eq!(iter.collect::<Vec<_>>().len(), 3);
/// ```
#[derive(Clone)]
pub struct Components<'a> {
    path: &'a str,
    front: usize,
    back: usize,
    /// End of the leading separator run; zero for relative paths.
    root_end: usize,
}

impl<'a> Components<'a> {
    /// Creates a cursor spanning the whole of `path`.
    pub fn new(path: &'a str) -> Self {
        let root_end = path
            .bytes()
            .take_while(|&b| b == SEPARATOR_BYTE)
            .count();

        let mut components = Self {
            path,
            front: 0,
            back: path.len(),
            root_end,
        };
        components.trim_back();
        components
    }

    /// Returns true if no components remain.
    pub fn is_empty(&self) -> bool {
        self.front >= self.back
    }

    /// Returns the component at the front without consuming it.
    pub fn peek(&self) -> Option<Component<'a>> {
        if self.is_empty() {
            return None;
        }

        if self.at_root() {
            return Some(Component::Root);
        }

        let end = self.segment_end(self.front);
        let text = &self.path[self.front..end];

        if self.front == 0 && text == "." {
            Some(Component::CurDir)
        } else {
            Some(Component::from_segment(text))
        }
    }

    /// Returns the component at the back without consuming it.
    pub fn peek_back(&self) -> Option<Component<'a>> {
        if self.is_empty() {
            return None;
        }

        if self.at_root() && self.back <= self.root_end {
            return Some(Component::Root);
        }

        let start = self.segment_start(self.back);
        let text = &self.path[start..self.back];

        if start == 0 && text == "." {
            Some(Component::CurDir)
        } else {
            Some(Component::from_segment(text))
        }
    }

    /// Drops up to `n` components from the front.
    pub fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if self.is_empty() {
                break;
            }

            self.front = if self.at_root() {
                self.root_end
            } else {
                self.segment_end(self.front)
            };
            self.trim_front();
        }
    }

    /// Drops up to `n` components from the back.
    ///
    /// Advancing back from the root component empties the cursor; the window
    /// never moves below index 0.
    pub fn advance_back(&mut self, n: usize) {
        for _ in 0..n {
            if self.is_empty() {
                break;
            }

            if self.at_root() && self.back <= self.root_end {
                self.back = self.front;
            } else {
                self.back = self.segment_start(self.back);
                self.trim_back();
            }
        }
    }

    /// Returns the remaining window as a string slice.
    pub fn as_str(&self) -> &'a str {
        if self.is_empty() {
            ""
        } else {
            &self.path[self.front..self.back]
        }
    }

    /// Returns the remaining window as a [`Path`].
    ///
    /// An exhausted cursor yields the null path.
    pub fn to_path(&self) -> Path {
        if self.is_empty() {
            Path::null()
        } else {
            Path::new(self.as_str())
        }
    }

    /// True while the front of the window still sits on the root component.
    fn at_root(&self) -> bool {
        self.front == 0 && self.root_end > 0
    }

    /// End of the segment starting at `start`, bounded by the window.
    fn segment_end(&self, start: usize) -> usize {
        match self.path[start..self.back].find(SEPARATOR) {
            Some(offset) => start + offset,
            None => self.back,
        }
    }

    /// Start of the segment ending at `end`, bounded by the window.
    fn segment_start(&self, end: usize) -> usize {
        match self.path[self.front..end].rfind(SEPARATOR) {
            Some(offset) => self.front + offset + 1,
            None => self.front,
        }
    }

    /// Advances `front` past separators and `.` segments.
    fn trim_front(&mut self) {
        let bytes = self.path.as_bytes();
        loop {
            while self.front < self.back && bytes[self.front] == SEPARATOR_BYTE {
                self.front += 1;
            }
            if self.front >= self.back {
                break;
            }

            let end = self.segment_end(self.front);
            if &self.path[self.front..end] == "." {
                self.front = end;
            } else {
                break;
            }
        }
    }

    /// Retracts `back` past trailing separators and `.` segments, keeping the
    /// root run and a leading `.` intact.
    fn trim_back(&mut self) {
        let bytes = self.path.as_bytes();
        let floor = if self.front == 0 {
            self.root_end
        } else {
            self.front
        };

        loop {
            while self.back > floor && bytes[self.back - 1] == SEPARATOR_BYTE {
                self.back -= 1;
            }
            if self.back <= floor {
                break;
            }

            let start = self.segment_start(self.back);
            if start != 0 && &self.path[start..self.back] == "." {
                self.back = start;
            } else {
                break;
            }
        }
    }
}

impl<'a> Iterator for Components<'a> {
    type Item = Component<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let component = self.peek()?;
        self.advance(1);
        Some(component)
    }
}

impl DoubleEndedIterator for Components<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let component = self.peek_back()?;
        self.advance_back(1);
        Some(component)
    }
}

impl fmt::Debug for Components<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
