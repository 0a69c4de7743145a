use std::fmt;

use crate::Tag;

/// The entries of a Compound tag: keys mapped to child tags, in the order
/// they were inserted.
///
/// Keys are raw bytes and unique within a compound. Lookup is a linear scan,
/// which is fast for the small compounds NBT is made of and keeps the order
/// stable. Obtain one with [`Tag::compound`]; changes go through
/// [`Tag::set`] and [`Tag::delete`].
#[derive(Default, PartialEq)]
pub struct Compound {
    entries: Vec<Entry>,
}

#[derive(PartialEq)]
struct Entry {
    key: Box<[u8]>,
    value: Tag,
}

impl Compound {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value for `key`, compared byte for byte.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Tag> {
        self.position(key.as_ref()).map(|i| &self.entries[i].value)
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.position(key.as_ref()).is_some()
    }

    /// Iterate the entries in insertion order. Each call starts from the
    /// first entry.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Tag> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Remove any entry for `key`, then append the new entry at the end.
    pub(crate) fn set(&mut self, key: &[u8], value: Tag) {
        self.delete(key);
        self.entries.push(Entry {
            key: key.into(),
            value,
        });
    }

    pub(crate) fn delete(&mut self, key: &[u8]) -> Option<Tag> {
        let i = self.position(key)?;
        Some(self.entries.remove(i).value)
    }

    fn position(&self, key: &[u8]) -> Option<usize> {
        self.entries.iter().position(|e| &*e.key == key)
    }
}

/// Iterator over the `(key, value)` entries of a [`Compound`].
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a Tag);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&*e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Compound {
    type Item = (&'a [u8], &'a Tag);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (String::from_utf8_lossy(k), v)))
            .finish()
    }
}
