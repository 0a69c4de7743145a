//! `serde::Serialize` for the tag tree, so documents can be dumped to other
//! formats such as JSON. Strings and keys are converted lossily to UTF-8.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::tag::Payload;
use crate::{Compound, Document, Tag};

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &*self.payload() {
            Payload::End => serializer.serialize_unit(),
            Payload::Byte(v) => serializer.serialize_i8(*v),
            Payload::Short(v) => serializer.serialize_i16(*v),
            Payload::Int(v) => serializer.serialize_i32(*v),
            Payload::Long(v) => serializer.serialize_i64(*v),
            Payload::String(s) => serializer.serialize_str(&String::from_utf8_lossy(s)),
            Payload::Compound(c) => c.serialize(serializer),
        }
    }
}

impl Serialize for Compound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(&String::from_utf8_lossy(k), v)?;
        }
        map.end()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut doc = serializer.serialize_struct("Document", 3)?;
        doc.serialize_field("name", &String::from_utf8_lossy(self.name()))?;
        doc.serialize_field("kind", &self.root_kind())?;
        doc.serialize_field("root", self.root())?;
        doc.end()
    }
}
