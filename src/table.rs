#[cfg(test)]
#[path = "./table_tests.rs"]
mod tests;

use std::mem;

use indexmap::IndexMap;

use crate::error::{ErrorKind, Scope};
use crate::value::{Map, Table, Value};

/// Index into the builder's node arena.
type NodeId = usize;

const ROOT: NodeId = 0;

type EntryMap = IndexMap<String, Entry, foldhash::fast::RandomState>;

/// What a key inside a node maps to while the document is being built.
enum Entry {
    /// A committed value. Headers can never reopen these.
    Value(Value),
    /// A nested table, still open for extension.
    Table(NodeId),
    /// An array of tables fed by `[[header]]` lines. Never empty.
    TableArray(Vec<NodeId>),
}

/// One table under construction.
#[derive(Default)]
struct Node {
    entries: EntryMap,
    /// Set once a `[header]` named this node (or a `[[header]]` created it).
    /// Plain nodes only exist through dotted-key traversal and may be
    /// promoted later.
    defined: bool,
    comment: Option<String>,
}

/// Copyable summary of an entry, so the arena stays borrowable while the
/// caller decides what to do.
#[derive(Clone, Copy)]
enum Probe {
    Table { id: NodeId, defined: bool },
    Aot { last: NodeId },
    StaticArray,
    OtherValue,
}

/// Builds the document table from parsed statements.
///
/// Key-value statements resolve relative to the current table; headers
/// resolve from the root. All placement rules live here, the parser only
/// feeds in paths and values.
pub(crate) struct TableBuilder {
    arena: Vec<Node>,
    current: NodeId,
    /// Path of the current table, `None` before the first header.
    current_path: Option<Vec<String>>,
    current_is_array: bool,
    /// Comment lines waiting for the next header.
    comments: Vec<String>,
    attach_comments: bool,
}

impl TableBuilder {
    pub(crate) fn new(attach_comments: bool) -> Self {
        Self {
            arena: vec![Node::default()],
            current: ROOT,
            current_path: None,
            current_is_array: false,
            comments: Vec::new(),
            attach_comments,
        }
    }

    fn alloc(&mut self, defined: bool) -> NodeId {
        self.arena.push(Node {
            defined,
            ..Node::default()
        });
        self.arena.len() - 1
    }

    fn probe(&self, node: NodeId, segment: &str) -> Option<Probe> {
        match self.arena[node].entries.get(segment)? {
            Entry::Table(id) => Some(Probe::Table {
                id: *id,
                defined: self.arena[*id].defined,
            }),
            Entry::TableArray(elements) => Some(Probe::Aot {
                last: elements[elements.len() - 1],
            }),
            Entry::Value(Value::Array(..)) => Some(Probe::StaticArray),
            Entry::Value(..) => Some(Probe::OtherValue),
        }
    }

    fn scope(&self) -> Scope {
        match &self.current_path {
            None => Scope::Global,
            Some(path) if self.current_is_array => Scope::ArrayOfTables(path.clone()),
            Some(path) => Scope::Table(path.clone()),
        }
    }

    fn key_not_allowed(&self, path: Vec<String>, upto: usize, array: bool) -> ErrorKind {
        let table = self.current_path.clone().unwrap_or_default();
        let mut culprit = table.clone();
        culprit.extend_from_slice(&path[..=upto]);
        ErrorKind::KeyNotAllowed {
            path,
            table,
            culprit,
            array,
        }
    }

    /// Commits `key = value`, resolving dotted intermediates relative to the
    /// current table. Discards any buffered comments.
    pub(crate) fn set(&mut self, path: Vec<String>, value: Value) -> Result<(), ErrorKind> {
        self.comments.clear();
        let mut node = self.current;
        for i in 0..path.len() - 1 {
            match self.probe(node, &path[i]) {
                None => {
                    let child = self.alloc(false);
                    self.arena[node]
                        .entries
                        .insert(path[i].clone(), Entry::Table(child));
                    node = child;
                }
                Some(Probe::Table { id, defined: false }) => node = id,
                Some(Probe::Table { defined: true, .. }) => {
                    return Err(self.key_not_allowed(path, i, false));
                }
                Some(Probe::Aot { .. }) => {
                    return Err(self.key_not_allowed(path, i, true));
                }
                Some(Probe::StaticArray | Probe::OtherValue) => {
                    return Err(ErrorKind::FailedToAccess {
                        culprit: path[..=i].to_vec(),
                        path,
                        scope: self.scope(),
                    });
                }
            }
        }
        let last = &path[path.len() - 1];
        if self.arena[node].entries.contains_key(last) {
            return Err(ErrorKind::DuplicateKey {
                scope: self.scope(),
                path,
            });
        }
        let last = last.clone();
        self.arena[node].entries.insert(last, Entry::Value(value));
        Ok(())
    }

    /// Handles a `[path]` header: resolves from the root, then defines or
    /// reopens the named table and makes it current.
    pub(crate) fn switch_table(&mut self, path: Vec<String>) -> Result<(), ErrorKind> {
        let mut node = ROOT;
        let mut has_defined_table = false;
        for i in 0..path.len() - 1 {
            match self.probe(node, &path[i]) {
                None => {
                    let child = self.alloc(false);
                    self.arena[node]
                        .entries
                        .insert(path[i].clone(), Entry::Table(child));
                    node = child;
                }
                Some(Probe::Table { id, defined }) => {
                    has_defined_table |= defined;
                    node = id;
                }
                Some(Probe::Aot { last }) => node = last,
                Some(Probe::StaticArray) => {
                    return Err(ErrorKind::ExtendStaticArray {
                        culprit: path[..=i].to_vec(),
                        path,
                    });
                }
                Some(Probe::OtherValue) => {
                    return Err(ErrorKind::TableIsNonTable {
                        culprit: path[..=i].to_vec(),
                        path,
                        array: false,
                    });
                }
            }
        }
        let last = &path[path.len() - 1];
        let probe = self.probe(node, last);
        // Reaching an existing entry through an explicitly defined table is
        // a redefinition no matter what the entry is.
        if probe.is_some() && has_defined_table {
            return Err(ErrorKind::DuplicateTable { path });
        }
        let id = match probe {
            None => {
                let child = self.alloc(true);
                self.arena[node]
                    .entries
                    .insert(last.clone(), Entry::Table(child));
                child
            }
            Some(Probe::Table { defined: true, .. }) => {
                return Err(ErrorKind::DuplicateTable { path });
            }
            Some(Probe::Table { id, defined: false }) => {
                // A table only known from dotted keys; the header claims it.
                self.arena[id].defined = true;
                id
            }
            Some(Probe::Aot { .. } | Probe::StaticArray) => {
                return Err(ErrorKind::TableIsArrayOfTables { path });
            }
            Some(Probe::OtherValue) => {
                return Err(ErrorKind::TableIsNonTable {
                    culprit: path.clone(),
                    path,
                    array: false,
                });
            }
        };
        self.attach_buffered_comments(id);
        self.current = id;
        self.current_path = Some(path);
        self.current_is_array = false;
        Ok(())
    }

    /// Handles a `[[path]]` header: appends a fresh element to the named
    /// array of tables and makes it current.
    pub(crate) fn switch_array_of_tables(&mut self, path: Vec<String>) -> Result<(), ErrorKind> {
        let mut node = ROOT;
        for i in 0..path.len() - 1 {
            match self.probe(node, &path[i]) {
                None => {
                    let child = self.alloc(false);
                    self.arena[node]
                        .entries
                        .insert(path[i].clone(), Entry::Table(child));
                    node = child;
                }
                Some(Probe::Table { id, .. }) => node = id,
                Some(Probe::Aot { last }) => node = last,
                Some(Probe::StaticArray) => {
                    return Err(ErrorKind::ExtendStaticArray {
                        culprit: path[..=i].to_vec(),
                        path,
                    });
                }
                Some(Probe::OtherValue) => {
                    return Err(ErrorKind::TableIsNonTable {
                        culprit: path[..=i].to_vec(),
                        path,
                        array: true,
                    });
                }
            }
        }
        let last = &path[path.len() - 1];
        let element = match self.probe(node, last) {
            None => {
                let element = self.alloc(true);
                self.arena[node]
                    .entries
                    .insert(last.clone(), Entry::TableArray(vec![element]));
                element
            }
            Some(Probe::Aot { .. }) => {
                let element = self.alloc(true);
                if let Some(Entry::TableArray(elements)) = self.arena[node].entries.get_mut(last) {
                    elements.push(element);
                }
                element
            }
            Some(Probe::StaticArray) => {
                return Err(ErrorKind::ArrayOfTablesIsKey { path });
            }
            Some(Probe::Table { .. } | Probe::OtherValue) => {
                return Err(ErrorKind::ArrayOfTablesIsOtherType { path });
            }
        };
        self.attach_buffered_comments(element);
        self.current = element;
        self.current_path = Some(path);
        self.current_is_array = true;
        Ok(())
    }

    /// Buffers a comment line for the next header. The text is everything
    /// after `#`, untouched.
    pub(crate) fn add_comment(&mut self, text: &str) {
        if self.attach_comments {
            self.comments.push(text.to_owned());
        }
    }

    /// Drops buffered comments; called when a blank line separates them from
    /// whatever follows.
    pub(crate) fn clear_comments(&mut self) {
        self.comments.clear();
    }

    fn attach_buffered_comments(&mut self, id: NodeId) {
        if !self.comments.is_empty() {
            self.arena[id].comment = Some(self.comments.join("\n"));
        }
        self.comments.clear();
    }

    /// Collapses the arena into the final nested [`Table`].
    pub(crate) fn into_table(mut self) -> Table {
        self.collapse(ROOT)
    }

    fn collapse(&mut self, id: NodeId) -> Table {
        let node = mem::take(&mut self.arena[id]);
        let mut entries = Map::default();
        for (key, entry) in node.entries {
            let value = match entry {
                Entry::Value(value) => value,
                Entry::Table(child) => Value::Table(self.collapse(child)),
                Entry::TableArray(elements) => Value::Array(
                    elements
                        .into_iter()
                        .map(|element| Value::Table(self.collapse(element)))
                        .collect(),
                ),
            };
            entries.insert(key, value);
        }
        Table {
            entries,
            comment: node.comment,
        }
    }
}
