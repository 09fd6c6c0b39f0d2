use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::object::ObjectId;

/// How a flight is addressed on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DescriptorKind {
    Unknown,
    Path,
    Command,
}

impl DescriptorKind {
    /// Stable numeric tag used by the ticket encoding.
    pub fn tag(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Path => 1,
            Self::Command => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Unknown),
            1 => Some(Self::Path),
            2 => Some(Self::Command),
            _ => None,
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Path => write!(f, "path"),
            Self::Command => write!(f, "command"),
        }
    }
}

/// Caller-supplied addressing of a flight.
///
/// FlightCache itself only ever produces path descriptors with exactly one
/// segment: the lowercase hex [`ObjectId`]. Command descriptors are carried
/// through the protocol but are not resolvable to an object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightDescriptor {
    Path(Vec<Vec<u8>>),
    Command(String),
}

impl FlightDescriptor {
    /// Descriptor addressing a flight by path segments.
    pub fn for_path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        Self::Path(segments.into_iter().map(Into::into).collect())
    }

    /// Path descriptor naming a stored object.
    pub fn for_object(id: &ObjectId) -> Self {
        Self::Path(vec![id.to_hex().into_bytes()])
    }

    pub fn for_command(command: impl Into<String>) -> Self {
        Self::Command(command.into())
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Path(_) => DescriptorKind::Path,
            Self::Command(_) => DescriptorKind::Command,
        }
    }
}

impl fmt::Display for FlightDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(segments) => {
                let joined: Vec<String> = segments
                    .iter()
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect();
                write!(f, "path:{}", joined.join("/"))
            }
            Self::Command(cmd) => write!(f, "command:{cmd}"),
        }
    }
}

/// Normalized lookup key for a flight.
///
/// Equality and hashing are structural: two keys built from equivalent
/// descriptors compare equal, which is how a server recognises a flight it
/// advertised earlier when the ticket comes back.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightKey {
    pub kind: DescriptorKind,
    pub command: Option<String>,
    pub path: Option<Vec<Vec<u8>>>,
}

impl FlightKey {
    pub fn new(kind: DescriptorKind, command: Option<String>, path: Option<Vec<Vec<u8>>>) -> Self {
        Self { kind, command, path }
    }

    /// Map a wire descriptor to its lookup key.
    pub fn from_descriptor(descriptor: &FlightDescriptor) -> Self {
        match descriptor {
            FlightDescriptor::Path(segments) => {
                Self::new(DescriptorKind::Path, None, Some(segments.clone()))
            }
            FlightDescriptor::Command(cmd) => {
                Self::new(DescriptorKind::Command, Some(cmd.clone()), None)
            }
        }
    }

    /// Key for the path descriptor naming `id`.
    pub fn for_object(id: &ObjectId) -> Self {
        Self::from_descriptor(&FlightDescriptor::for_object(id))
    }

    /// Rebuild the descriptor this key was derived from.
    pub fn to_descriptor(&self) -> Option<FlightDescriptor> {
        match self.kind {
            DescriptorKind::Path => self.path.clone().map(FlightDescriptor::Path),
            DescriptorKind::Command => self.command.clone().map(FlightDescriptor::Command),
            DescriptorKind::Unknown => None,
        }
    }

    /// Decode the object named by the first path segment.
    ///
    /// The segment must be the 40-character hex form of an [`ObjectId`].
    pub fn object_id(&self) -> Result<ObjectId, TypeError> {
        if self.kind != DescriptorKind::Path {
            return Err(TypeError::MissingPath);
        }
        let segment = self
            .path
            .as_ref()
            .and_then(|p| p.first())
            .ok_or(TypeError::MissingPath)?;
        let text = std::str::from_utf8(segment)
            .map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        ObjectId::from_hex(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equivalent_descriptors_produce_equal_keys() {
        let id = ObjectId::generate(b"Hello World!");
        let a = FlightKey::from_descriptor(&FlightDescriptor::for_object(&id));
        let b = FlightKey::from_descriptor(&FlightDescriptor::for_path([id.to_hex()]));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn path_key_resolves_object_id() {
        let id = ObjectId::generate(b"2x2x2");
        let key = FlightKey::for_object(&id);
        assert_eq!(key.kind, DescriptorKind::Path);
        assert!(key.command.is_none());
        assert_eq!(key.object_id().unwrap(), id);
    }

    #[test]
    fn command_key_has_no_object() {
        let key = FlightKey::from_descriptor(&FlightDescriptor::for_command("SELECT 1"));
        assert_eq!(key.kind, DescriptorKind::Command);
        assert_eq!(key.command.as_deref(), Some("SELECT 1"));
        assert!(key.path.is_none());
        assert_eq!(key.object_id(), Err(TypeError::MissingPath));
    }

    #[test]
    fn empty_path_is_rejected() {
        let key = FlightKey::from_descriptor(&FlightDescriptor::Path(vec![]));
        assert_eq!(key.object_id(), Err(TypeError::MissingPath));
    }

    #[test]
    fn malformed_segments_are_rejected() {
        let key = FlightKey::from_descriptor(&FlightDescriptor::for_path(["not-hex"]));
        assert!(matches!(key.object_id(), Err(TypeError::InvalidHex(_))));

        let key = FlightKey::from_descriptor(&FlightDescriptor::for_path(["abcdef"]));
        assert_eq!(
            key.object_id(),
            Err(TypeError::InvalidLength { expected: 20, actual: 3 })
        );
    }

    #[test]
    fn descriptor_roundtrips_through_key() {
        let desc = FlightDescriptor::for_path(["a", "b"]);
        let key = FlightKey::from_descriptor(&desc);
        assert_eq!(key.to_descriptor(), Some(desc));
        let unknown = FlightKey::new(DescriptorKind::Unknown, None, None);
        assert!(unknown.to_descriptor().is_none());
    }

    #[test]
    fn kind_tags_roundtrip() {
        for kind in [DescriptorKind::Unknown, DescriptorKind::Path, DescriptorKind::Command] {
            assert_eq!(DescriptorKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(DescriptorKind::from_tag(9), None);
    }

    #[test]
    fn descriptor_display() {
        let desc = FlightDescriptor::for_path(["abc"]);
        assert_eq!(desc.to_string(), "path:abc");
        assert_eq!(FlightDescriptor::for_command("x").to_string(), "command:x");
    }
}
