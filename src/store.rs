//! Line-oriented stores persisted between runs.
//!
//! Timing and result stores share one format, `<integer> <case-name>` per
//! line, and differ only in the value type. Reading is forgiving: a missing
//! file is an empty store, and lines that do not start with an integer
//! followed by a name are skipped. The first line for a name wins.

use std::{
    fmt::Display,
    fs,
    io::{self, Write},
    path::Path,
    str::FromStr,
};

use ahash::AHashMap;

use crate::TrackerError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueStore<V> {
    entries: AHashMap<String, V>,
}

/// Case name to previous duration in nanoseconds.
pub type TimingStore = ValueStore<i64>;
/// Case name to assertion failure count.
pub type ResultStore = ValueStore<usize>;

impl<V> Default for ValueStore<V> {
    fn default() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }
}

impl<V> ValueStore<V>
where
    V: Copy + FromStr + Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path`, treating a missing or unreadable file as empty.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(store) => {
                tracing::debug!(path = %path.display(), entries = store.len(), "loaded store");
                store
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "no previous store data");
                Self::new()
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self, TrackerError> {
        let data = fs::read(path)
            .map_err(|e| TrackerError::store_unavailable(format!("{}: {e}", path.display())))?;
        Ok(Self::parse_bytes(&data))
    }

    pub fn parse(text: &str) -> Self {
        Self::parse_bytes(text.as_bytes())
    }

    /// Parses raw store bytes; lines that are not valid UTF-8 are skipped
    /// like any other malformed line.
    pub fn parse_bytes(data: &[u8]) -> Self {
        let mut store = Self::new();
        for (idx, raw) in data.split(|byte| *byte == b'\n').enumerate() {
            let Ok(line) = std::str::from_utf8(raw) else {
                tracing::debug!(line = idx + 1, "skipping store line that is not UTF-8");
                continue;
            };
            match parse_line::<V>(line) {
                Some((value, name)) => {
                    store.insert_if_absent(name, value);
                }
                None if line.trim().is_empty() => {}
                None => tracing::debug!(line = idx + 1, "skipping malformed store line"),
            }
        }
        store
    }

    pub fn get(&self, name: &str) -> Option<V> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Inserts only when `name` has no value yet; returns whether it did.
    pub fn insert_if_absent(&mut self, name: &str, value: V) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), value);
        true
    }

    pub fn set(&mut self, name: &str, value: V) {
        self.entries.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store text for the names in `order`; names without a value, or that
    /// could not be read back, are left out.
    pub fn render<'a, I>(&self, order: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = String::new();
        for name in order {
            if !is_storable_name(name) {
                continue;
            }
            if let Some(value) = self.get(name) {
                out.push_str(&format!("{value} {name}\n"));
            }
        }
        out
    }

    pub fn write<'a, I>(&self, path: &Path, order: I) -> Result<(), TrackerError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        write_text(path, &self.render(order))
    }
}

/// Whether `name` survives a write/read cycle of the store format.
pub fn is_storable_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

pub fn write_text(path: &Path, text: &str) -> Result<(), TrackerError> {
    let write = || -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(text.as_bytes())?;
        file.flush()
    };
    write().map_err(|e| TrackerError::store_write(format!("{}: {e}", path.display())))
}

fn parse_line<V: FromStr>(line: &str) -> Option<(V, &str)> {
    let mut tokens = line.split_whitespace();
    let value = tokens.next()?.parse().ok()?;
    let name = tokens.next()?;
    Some((value, name))
}
