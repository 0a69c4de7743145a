use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::{Compound, TagKind};

/// A single node of an NBT tree. It owns its payload, and a compound owns a
/// reference to each of its children.
///
/// `Tag` is a handle: cloning it makes another reference to the same node
/// rather than copying the data, so a change made through one handle is seen
/// through all of them. The node is freed when the last handle is dropped.
/// Dropping a compound releases its children, and any child still referenced
/// from elsewhere lives on.
///
/// Accessors are typed. Asking an integer tag for its string, or a string tag
/// for its compound, is a bug in the caller and panics. The `as_*` variants
/// return `None` instead.
///
/// ```
/// use redstone_nbt::{Tag, TagKind};
///
/// let player = Tag::new(TagKind::Compound);
/// player.set("Health", &Tag::from(20i16));
/// player.set("Name", &Tag::from("Steve"));
///
/// assert_eq!(player.get("Health").unwrap().integer(), 20);
/// assert_eq!(&*player.get("Name").unwrap().string(), b"Steve");
/// ```
#[derive(Clone)]
pub struct Tag(Rc<RefCell<Payload>>);

#[derive(PartialEq)]
pub(crate) enum Payload {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    String(Vec<u8>),
    Compound(Compound),
}

impl Payload {
    fn kind(&self) -> TagKind {
        match self {
            Payload::End => TagKind::End,
            Payload::Byte(_) => TagKind::Byte,
            Payload::Short(_) => TagKind::Short,
            Payload::Int(_) => TagKind::Int,
            Payload::Long(_) => TagKind::Long,
            Payload::String(_) => TagKind::String,
            Payload::Compound(_) => TagKind::Compound,
        }
    }
}

impl Tag {
    /// Create a zero valued tag of the given kind: `0` for integers, an empty
    /// string or an empty compound.
    ///
    /// # Panics
    ///
    /// If `kind` is not supported, see [`TagKind::is_supported`].
    pub fn new(kind: TagKind) -> Tag {
        let payload = match kind {
            TagKind::End => Payload::End,
            TagKind::Byte => Payload::Byte(0),
            TagKind::Short => Payload::Short(0),
            TagKind::Int => Payload::Int(0),
            TagKind::Long => Payload::Long(0),
            TagKind::String => Payload::String(Vec::new()),
            TagKind::Compound => Payload::Compound(Compound::new()),
            _ => panic!("cannot create a tag of unsupported kind {:?}", kind),
        };
        Tag::from_payload(payload)
    }

    pub(crate) fn from_payload(payload: Payload) -> Tag {
        Tag(Rc::new(RefCell::new(payload)))
    }

    pub fn kind(&self) -> TagKind {
        self.0.borrow().kind()
    }

    /// Number of handles currently sharing this node, including this one and
    /// the ones held by parent compounds.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Tag) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The value of a Byte, Short, Int or Long tag, sign-extended.
    pub fn as_integer(&self) -> Option<i64> {
        match *self.0.borrow() {
            Payload::Byte(v) => Some(v as i64),
            Payload::Short(v) => Some(v as i64),
            Payload::Int(v) => Some(v as i64),
            Payload::Long(v) => Some(v),
            _ => None,
        }
    }

    /// The value of a Byte, Short, Int or Long tag, sign-extended.
    ///
    /// # Panics
    ///
    /// If this is not an integer tag.
    pub fn integer(&self) -> i64 {
        self.as_integer()
            .unwrap_or_else(|| panic!("{:?} tag is not an integer", self.kind()))
    }

    /// Set the value of an integer tag. The value is truncated to the width of
    /// the tag, so setting 300 on a Byte stores 44.
    ///
    /// # Panics
    ///
    /// If this is not an integer tag.
    pub fn set_integer(&self, value: i64) {
        match &mut *self.0.borrow_mut() {
            Payload::Byte(v) => *v = value as i8,
            Payload::Short(v) => *v = value as i16,
            Payload::Int(v) => *v = value as i32,
            Payload::Long(v) => *v = value,
            other => panic!("{:?} tag is not an integer", other.kind()),
        }
    }

    /// The bytes of a String tag.
    pub fn as_string(&self) -> Option<Ref<'_, [u8]>> {
        Ref::filter_map(self.0.borrow(), |p| match p {
            Payload::String(s) => Some(s.as_slice()),
            _ => None,
        })
        .ok()
    }

    /// The bytes of a String tag. They are exactly what was read, and might not
    /// be valid UTF-8.
    ///
    /// # Panics
    ///
    /// If this is not a String tag.
    pub fn string(&self) -> Ref<'_, [u8]> {
        let kind = self.kind();
        self.as_string()
            .unwrap_or_else(|| panic!("{:?} tag is not a string", kind))
    }

    /// The String tag's bytes decoded as UTF-8, with invalid sequences
    /// replaced.
    ///
    /// # Panics
    ///
    /// If this is not a String tag.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.string()).into_owned()
    }

    /// Replace the bytes of a String tag with a copy of `value`.
    ///
    /// # Panics
    ///
    /// If this is not a String tag.
    pub fn set_string(&self, value: impl AsRef<[u8]>) {
        match &mut *self.0.borrow_mut() {
            Payload::String(s) => *s = value.as_ref().to_vec(),
            other => panic!("{:?} tag is not a string", other.kind()),
        }
    }

    pub fn as_compound(&self) -> Option<Ref<'_, Compound>> {
        Ref::filter_map(self.0.borrow(), |p| match p {
            Payload::Compound(c) => Some(c),
            _ => None,
        })
        .ok()
    }

    /// Borrow the entries of a Compound tag, for example to iterate them.
    /// Changing this compound while the borrow is alive panics.
    ///
    /// # Panics
    ///
    /// If this is not a Compound tag, or the compound is being changed.
    pub fn compound(&self) -> Ref<'_, Compound> {
        let kind = self.kind();
        self.as_compound()
            .unwrap_or_else(|| panic!("{:?} tag is not a compound", kind))
    }

    fn compound_mut(&self) -> RefMut<'_, Compound> {
        RefMut::filter_map(self.0.borrow_mut(), |p| match p {
            Payload::Compound(c) => Some(c),
            _ => None,
        })
        .unwrap_or_else(|p| panic!("{:?} tag is not a compound", p.kind()))
    }

    /// Look up the child of a compound by key. The returned handle shares the
    /// child with the compound.
    ///
    /// # Panics
    ///
    /// If this is not a Compound tag.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<Tag> {
        self.compound().get(key).cloned()
    }

    /// Put `value` into a compound under `key`. An existing entry with the same
    /// key is removed first, so the key always moves to the end of the
    /// iteration order.
    ///
    /// # Panics
    ///
    /// If this is not a Compound tag, if the compound is currently borrowed,
    /// or if `value` is this tag or contains it. Trees can not have cycles.
    pub fn set(&self, key: impl AsRef<[u8]>, value: &Tag) {
        assert!(
            !value.contains_node(self),
            "inserting a tag into its own subtree would create a cycle"
        );
        self.compound_mut().set(key.as_ref(), value.clone());
    }

    /// Remove the entry for `key` from a compound, returning its value. Absent
    /// keys are ignored.
    ///
    /// # Panics
    ///
    /// If this is not a Compound tag, or if the compound is currently borrowed.
    pub fn delete(&self, key: impl AsRef<[u8]>) -> Option<Tag> {
        self.compound_mut().delete(key.as_ref())
    }

    /// Whether `needle` is this node or any node below it.
    fn contains_node(&self, needle: &Tag) -> bool {
        if self.ptr_eq(needle) {
            return true;
        }

        match self.as_compound() {
            Some(c) => c.values().any(|child| child.contains_node(needle)),
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn downgrade(&self) -> std::rc::Weak<RefCell<Payload>> {
        Rc::downgrade(&self.0)
    }

    pub(crate) fn payload(&self) -> Ref<'_, Payload> {
        self.0.borrow()
    }
}

impl From<i8> for Tag {
    fn from(v: i8) -> Self {
        Tag::from_payload(Payload::Byte(v))
    }
}

impl From<i16> for Tag {
    fn from(v: i16) -> Self {
        Tag::from_payload(Payload::Short(v))
    }
}

impl From<i32> for Tag {
    fn from(v: i32) -> Self {
        Tag::from_payload(Payload::Int(v))
    }
}

impl From<i64> for Tag {
    fn from(v: i64) -> Self {
        Tag::from_payload(Payload::Long(v))
    }
}

impl From<&[u8]> for Tag {
    fn from(v: &[u8]) -> Self {
        Tag::from_payload(Payload::String(v.to_vec()))
    }
}

impl From<Vec<u8>> for Tag {
    fn from(v: Vec<u8>) -> Self {
        Tag::from_payload(Payload::String(v))
    }
}

impl From<&str> for Tag {
    fn from(v: &str) -> Self {
        Tag::from(v.as_bytes())
    }
}

impl From<String> for Tag {
    fn from(v: String) -> Self {
        Tag::from(v.into_bytes())
    }
}

/// Compares values, not identity. Integers of different widths are never
/// equal, and compounds must have the same entries in the same order.
impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = match self.0.try_borrow() {
            Ok(p) => p,
            Err(_) => return f.write_str("<borrowed>"),
        };

        match &*payload {
            Payload::End => f.write_str("End"),
            Payload::Byte(v) => f.debug_tuple("Byte").field(v).finish(),
            Payload::Short(v) => f.debug_tuple("Short").field(v).finish(),
            Payload::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Payload::Long(v) => f.debug_tuple("Long").field(v).finish(),
            Payload::String(s) => f
                .debug_tuple("String")
                .field(&String::from_utf8_lossy(s))
                .finish(),
            Payload::Compound(c) => f.debug_tuple("Compound").field(c).finish(),
        }
    }
}
