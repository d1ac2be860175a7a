use std::fmt::Display;

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const TITLE_KEY: &str = "Title";

/// One member's detail page flattened into ordered key/value pairs.
///
/// Keys keep the position of their first insertion. Inserting a key that is
/// already present replaces its value, so the last pair on a page wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberRecord {
    fields: Vec<(String, String)>,
}

impl MemberRecord {
    pub fn new(title: Option<String>) -> Self {
        let mut record = Self::default();
        record.insert(TITLE_KEY, title.unwrap_or_default());
        record
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn title(&self) -> &str {
        self.get(TITLE_KEY).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemberRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::default();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for MemberRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Display for MemberRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = self.title();
        writeln!(
            f,
            "┌─ {}",
            if title.is_empty() { "[untitled]" } else { title }
        )?;
        for (k, v) in self.iter().filter(|(k, _)| *k != TITLE_KEY) {
            writeln!(f, "│  {}: {}", k, v)?;
        }
        write!(f, "└─ {} field(s)", self.len())
    }
}

/// Records in listing order plus the union of their keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct MemberTable {
    records: Vec<MemberRecord>,
}

impl MemberTable {
    pub fn new(records: Vec<MemberRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MemberRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every key seen across all records, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for key in self.records.iter().flat_map(|r| r.keys()) {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
        columns
    }

    /// Cells aligned to [`columns`](Self::columns); missing fields are empty.
    pub fn rows(&self) -> Vec<Vec<&str>> {
        let columns = self.columns();
        self.records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

impl From<Vec<MemberRecord>> for MemberTable {
    fn from(records: Vec<MemberRecord>) -> Self {
        Self::new(records)
    }
}

impl Display for MemberTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            writeln!(f, "{:>3}. {}", i + 1, record)?;
        }
        Ok(())
    }
}
