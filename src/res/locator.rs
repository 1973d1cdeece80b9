//! Source locators of preloaded items.

use std::fmt;

use crate::errors::*;

/// The schema assumed for locators without an explicit one, e.g. `assets/crate.png`.
pub const DEFAULT_SCHEMA: &str = "file";

/// A parsed source locator. On creation, the locator will be split into schema,
/// path, query and fragment, and indices to its parts will be stored internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    src: String,
    schema: Option<(usize, usize)>,
    path: (usize, usize),
    query: Option<(usize, usize)>,
    fragment: Option<(usize, usize)>,
}

impl Locator {
    /// Parses a new locator.
    pub fn new<T: Into<String>>(src: T) -> Result<Self> {
        let src = src.into();
        if src.trim().is_empty() {
            return Err(Error::MalformedLocator(src));
        }

        let (schema, iter) = match src.find("://") {
            Some(0) => return Err(Error::MalformedLocator(src)),
            Some(index) => (Some((0, index)), index + 3),
            None => (None, 0),
        };

        let mut end = src.len();
        let mut fragment = None;
        if let Some(index) = src[iter..].find('#') {
            fragment = Some((iter + index + 1, end));
            end = iter + index;
        }

        let mut query = None;
        if let Some(index) = src[iter..end].find('?') {
            query = Some((iter + index + 1, end));
            end = iter + index;
        }

        if end <= iter {
            return Err(Error::MalformedLocator(src));
        }

        Ok(Locator {
            schema,
            path: (iter, end),
            query,
            fragment,
            src,
        })
    }

    /// The schema of this locator, `file` if omitted.
    #[inline]
    pub fn schema(&self) -> &str {
        self.schema
            .map(|(b, e)| &self.src[b..e])
            .unwrap_or(DEFAULT_SCHEMA)
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.src[self.path.0..self.path.1]
    }

    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.query.map(|(b, e)| &self.src[b..e])
    }

    #[inline]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.map(|(b, e)| &self.src[b..e])
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.src
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.src)
    }
}
