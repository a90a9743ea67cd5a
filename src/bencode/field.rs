use super::record::Record;
use crate::constants::{DIRECTIVE_SEPARATOR, DIRECTIVE_SKIP, OPTION_OMIT_EMPTY};
use bytes::Bytes;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// How one record field maps to a dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    /// Dictionary key. Empty for an embedded field that is flattened.
    pub wire_name: String,
    /// Drop the field from the output when it holds its zero value.
    pub omit_empty: bool,
    /// Never encode the field and never match it while decoding.
    pub skip: bool,
    /// The field is another record embedded in its parent.
    pub embedded: bool,
}

impl FieldMeta {
    /// Parses a field directive.
    ///
    /// | Directive | Meaning |
    /// |-----------|---------|
    /// | `""` | key is the field name (embedded fields are flattened) |
    /// | `"-"` | skip the field |
    /// | `"name"` | key is `name` |
    /// | `"name,omitempty"` | key is `name`, omitted when zero |
    /// | `",omitempty"` | key is the field name, omitted when zero |
    ///
    /// # Examples
    ///
    /// ```
    /// use bencoding::FieldMeta;
    ///
    /// let meta = FieldMeta::parse("creation_date", "creation date,omitempty", false);
    /// assert_eq!(meta.wire_name, "creation date");
    /// assert!(meta.omit_empty);
    ///
    /// let meta = FieldMeta::parse("base", "", true);
    /// assert!(meta.flattens());
    /// ```
    pub fn parse(field_name: &str, directive: &str, embedded: bool) -> Self {
        let mut meta = FieldMeta {
            wire_name: String::new(),
            omit_empty: false,
            skip: false,
            embedded,
        };

        let mut parts = directive.split(DIRECTIVE_SEPARATOR);
        let name = parts.next().unwrap_or_default();
        if name == DIRECTIVE_SKIP {
            meta.skip = true;
            return meta;
        }

        meta.omit_empty = parts.any(|option| option == OPTION_OMIT_EMPTY);
        meta.wire_name = match (name.is_empty(), embedded) {
            (true, true) => String::new(),
            (true, false) => field_name.to_owned(),
            (false, _) => name.to_owned(),
        };
        meta
    }

    /// Returns `true` if the field's own fields are merged into its parent.
    pub fn flattens(&self) -> bool {
        self.embedded && !self.skip && self.wire_name.is_empty()
    }
}

/// Declaration of one record field, as written by the record's author.
#[derive(Debug, Clone, Copy)]
pub struct FieldDecl {
    name: &'static str,
    directive: &'static str,
    embedded: Option<fn() -> Arc<FieldSet>>,
}

impl FieldDecl {
    pub const fn new(name: &'static str, directive: &'static str) -> Self {
        Self {
            name,
            directive,
            embedded: None,
        }
    }

    /// Declares a field holding a record whose fields are flattened into the parent.
    ///
    /// `project` only names the field's type; it is never called.
    pub fn embedded<R, E, F>(name: &'static str, _project: F) -> Self
    where
        E: Record + 'static,
        F: Fn(&R) -> &E,
    {
        Self {
            name,
            directive: "",
            embedded: Some(field_set::<E> as fn() -> Arc<FieldSet>),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn meta(&self) -> FieldMeta {
        FieldMeta::parse(self.name, self.directive, self.embedded.is_some())
    }
}

/// One dictionary entry of a resolved record.
#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub wire_name: Bytes,
    pub omit_empty: bool,
    /// Field indices from the outer record down to the leaf field.
    pub path: Vec<usize>,
}

/// A record shape resolved to the entries that appear on the wire.
///
/// Skipped fields are absent and embedded records are flattened. Entries keep
/// declaration order; when two entries share a wire name the later one
/// replaces the earlier in place.
#[derive(Debug, Default)]
pub struct FieldSet {
    entries: Vec<FieldEntry>,
    index: HashMap<Bytes, usize>,
}

impl FieldSet {
    pub fn resolve(decls: &[FieldDecl]) -> Self {
        let mut set = FieldSet::default();

        for (i, decl) in decls.iter().enumerate() {
            let meta = decl.meta();
            if meta.skip {
                continue;
            }

            match decl.embedded {
                Some(inner) if meta.flattens() => {
                    for entry in inner().entries() {
                        let mut path = Vec::with_capacity(entry.path.len() + 1);
                        path.push(i);
                        path.extend_from_slice(&entry.path);
                        set.insert(FieldEntry {
                            wire_name: entry.wire_name.clone(),
                            omit_empty: entry.omit_empty,
                            path,
                        });
                    }
                }
                _ => set.insert(FieldEntry {
                    wire_name: Bytes::from(meta.wire_name),
                    omit_empty: meta.omit_empty,
                    path: vec![i],
                }),
            }
        }

        set
    }

    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn get(&self, wire_name: &[u8]) -> Option<&FieldEntry> {
        self.index.get(wire_name).map(|&slot| &self.entries[slot])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, entry: FieldEntry) {
        match self.index.get(&entry.wire_name) {
            Some(&slot) => self.entries[slot] = entry,
            None => {
                self.index.insert(entry.wire_name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }
}

type FieldCache = RwLock<HashMap<TypeId, Arc<FieldSet>>>;

static FIELD_CACHE: OnceLock<FieldCache> = OnceLock::new();

/// Returns the resolved field set of `R`, resolving it on first use.
///
/// Resolution runs outside the lock, so embedded records resolve recursively.
/// If two threads race, the first inserted set wins and both return it.
pub fn field_set<R: Record + 'static>() -> Arc<FieldSet> {
    let cache = FIELD_CACHE.get_or_init(FieldCache::default);
    let id = TypeId::of::<R>();

    if let Some(set) = cache.read().get(&id) {
        return Arc::clone(set);
    }

    let resolved = Arc::new(FieldSet::resolve(&R::fields()));
    trace!(
        record = std::any::type_name::<R>(),
        entries = resolved.len(),
        "resolved record fields"
    );
    Arc::clone(cache.write().entry(id).or_insert(resolved))
}
