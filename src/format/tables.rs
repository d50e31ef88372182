// Back-reference tables.
//
// Both tables are append-only and scoped to a single decode call: entries
// are numbered by first occurrence and looked up by that number later in
// the same stream.

use crate::error::{DecodeError, Result, TableKind};

/// String and type tables for one decode session.
#[derive(Debug, Default, Clone)]
pub struct BackReferenceTables {
    strings: Vec<String>,
    types: Vec<String>,
}

impl BackReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string, returning its index.
    pub fn add_string(&mut self, s: String) -> usize {
        self.strings.push(s);
        self.strings.len() - 1
    }

    /// Look up a previously added string. `offset` is used for the error.
    pub fn string(&self, index: u32, offset: usize) -> Result<&str> {
        lookup(&self.strings, TableKind::String, index, offset)
    }

    /// Append a type name, returning its index.
    pub fn add_type(&mut self, name: String) -> usize {
        self.types.push(name);
        self.types.len() - 1
    }

    /// Look up a previously added type name.
    pub fn type_name(&self, index: u32, offset: usize) -> Result<&str> {
        lookup(&self.types, TableKind::Type, index, offset)
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }
}

fn lookup(table: &[String], kind: TableKind, index: u32, offset: usize) -> Result<&str> {
    table
        .get(index as usize)
        .map(String::as_str)
        .ok_or(DecodeError::UndefinedBackReference {
            offset,
            table: kind,
            index,
            defined: table.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_indexed_by_first_occurrence() {
        let mut t = BackReferenceTables::new();
        assert_eq!(t.add_string("foo".into()), 0);
        assert_eq!(t.add_string("bar".into()), 1);
        assert_eq!(t.string(0, 0).unwrap(), "foo");
        assert_eq!(t.string(1, 0).unwrap(), "bar");
    }

    #[test]
    fn undefined_string_fails() {
        let mut t = BackReferenceTables::new();
        t.add_string("only".into());
        assert_eq!(
            t.string(1, 9),
            Err(DecodeError::UndefinedBackReference {
                offset: 9,
                table: TableKind::String,
                index: 1,
                defined: 1,
            })
        );
    }

    #[test]
    fn type_table_is_separate() {
        let mut t = BackReferenceTables::new();
        t.add_string("s".into());
        assert!(t.type_name(0, 0).is_err());
        t.add_type("System.Int32".into());
        assert_eq!(t.type_name(0, 0).unwrap(), "System.Int32");
        assert_eq!(t.types().len(), 1);
        assert_eq!(t.strings().len(), 1);
    }
}
