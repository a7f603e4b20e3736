//! Register descriptor table: folds the external `(name, bit_offset,
//! bit_size)` register-file description into closed `[from, to]` ranges.

use crate::error::RegisterFileError;
use std::collections::HashMap;

/// A single register alias's bit range, closed on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDescriptor {
    from: u32,
    to: u32,
}

impl RegisterDescriptor {
    /// Inclusive lower bound.
    pub const fn from(&self) -> u32 {
        self.from
    }

    /// Inclusive upper bound.
    pub const fn to(&self) -> u32 {
        self.to
    }
}

/// Immutable, post-init register descriptor table.
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    descriptors: HashMap<String, RegisterDescriptor>,
}

impl RegisterFile {
    /// Fold an iterable of `(name, bit_offset, bit_size)` into the
    /// descriptor table. Rejects zero-width registers and duplicate names —
    /// the original C source leaves both undefined; see `DESIGN.md`.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, RegisterFileError>
    where
        I: IntoIterator<Item = (&'a str, u32, u32)>,
    {
        let mut descriptors = HashMap::new();

        for (name, bit_offset, bit_size) in entries {
            if bit_size == 0 {
                return Err(RegisterFileError::EmptyRegister { name: name.to_string() });
            }

            let descriptor = RegisterDescriptor {
                from: bit_offset,
                to: bit_offset + bit_size - 1,
            };

            if descriptors.insert(name.to_string(), descriptor).is_some() {
                return Err(RegisterFileError::DuplicateRegister { name: name.to_string() });
            }
        }

        Ok(Self { descriptors })
    }

    /// Look up a register's descriptor by alias.
    pub fn get(&self, name: &str) -> Option<RegisterDescriptor> {
        self.descriptors.get(name).copied()
    }

    /// True if `name` is a known register alias.
    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }
}

/// Incremental builder for [`RegisterFile`], for callers assembling a
/// register layout piecewise rather than from one iterable.
#[derive(Debug, Clone, Default)]
pub struct RegisterFileBuilder {
    entries: Vec<(String, u32, u32)>,
}

impl RegisterFileBuilder {
    /// A fresh, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias with its bit offset and bit width.
    pub fn register(mut self, name: impl Into<String>, bit_offset: u32, bit_size: u32) -> Self {
        self.entries.push((name.into(), bit_offset, bit_size));
        self
    }

    /// Finalize into a [`RegisterFile`].
    pub fn build(self) -> Result<RegisterFile, RegisterFileError> {
        RegisterFile::from_entries(self.entries.iter().map(|(n, o, s)| (n.as_str(), *o, *s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_offset_and_size_into_closed_range() {
        let regs = RegisterFile::from_entries([("al", 0, 8)]).unwrap();
        let al = regs.get("al").unwrap();
        assert_eq!(al.from(), 0);
        assert_eq!(al.to(), 7);
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = RegisterFile::from_entries([("ax", 0, 16), ("ax", 0, 16)]).unwrap_err();
        assert_eq!(err, RegisterFileError::DuplicateRegister { name: "ax".into() });
    }

    #[test]
    fn rejects_zero_width() {
        let err = RegisterFile::from_entries([("z", 0, 0)]).unwrap_err();
        assert_eq!(err, RegisterFileError::EmptyRegister { name: "z".into() });
    }

    #[test]
    fn builder_matches_from_entries() {
        let regs = RegisterFileBuilder::new()
            .register("rax", 0, 64)
            .register("eax", 0, 32)
            .build()
            .unwrap();
        assert_eq!(regs.get("rax").unwrap().to(), 63);
        assert_eq!(regs.get("eax").unwrap().to(), 31);
    }
}
