/// Separator between the application GUID and the instance index.
pub const IDENTITY_SEPARATOR: char = '/';

/// Index used when an identity carries no instance index.
pub const DEFAULT_INSTANCE_INDEX: &str = "0";

/// A borrowed view over an instance identity such as
/// `7b8228a0-cf40-42d8-a7bb-b287a88198a3/0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceIdentity<'a>(&'a str);

impl<'a> InstanceIdentity<'a> {
    pub fn new(identity: &'a str) -> Self {
        Self(identity)
    }

    /// The application GUID, or the whole identity when there is no separator.
    pub fn guid(&self) -> &'a str {
        match self.0.split_once(IDENTITY_SEPARATOR) {
            Some((guid, _)) => guid,
            None => self.0,
        }
    }

    /// The instance index, `"0"` when there is no separator.
    pub fn index(&self) -> &'a str {
        match self.0.split_once(IDENTITY_SEPARATOR) {
            Some((_, index)) => index,
            None => DEFAULT_INSTANCE_INDEX,
        }
    }
}

impl<'a> From<&'a str> for InstanceIdentity<'a> {
    fn from(identity: &'a str) -> Self {
        Self::new(identity)
    }
}

impl std::fmt::Display for InstanceIdentity<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}
