use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::FieldId;
use crate::core::error::SchemaError;
use crate::core::field::{FieldKind, FieldNode};
use crate::core::field_path::FieldPath;

/// What happens to the children of a field whose type moves away from
/// `nested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildrenPolicy {
    /// Drop the subtree. Switching back to `nested` starts from no children.
    #[default]
    Discard,
    /// Keep the subtree hidden and bring it back when the field becomes
    /// `nested` again.
    Retain,
}

#[derive(Debug, Clone)]
struct FieldSlot {
    key: String,
    kind: FieldKind,
    // Only observable while `kind` is nested.
    children: Vec<FieldId>,
}

/// Arena of fields keyed by id. Ownership edges run parent to children only;
/// every id appears in exactly one sibling list.
#[derive(Debug, Clone, Default)]
pub struct FieldTree {
    slots: IndexMap<FieldId, FieldSlot>,
    roots: Vec<FieldId>,
    policy: ChildrenPolicy,
}

impl FieldTree {
    pub fn new(policy: ChildrenPolicy) -> Self {
        Self {
            slots: IndexMap::new(),
            roots: Vec::new(),
            policy,
        }
    }

    /// Builds a tree from snapshot nodes, keeping their ids. Fails without
    /// building anything when an id appears twice.
    pub fn from_nodes(nodes: Vec<FieldNode>, policy: ChildrenPolicy) -> Result<Self, SchemaError> {
        let mut tree = Self::new(policy);
        let mut roots = Vec::with_capacity(nodes.len());
        for node in nodes {
            roots.push(tree.insert_snapshot(node)?);
        }
        tree.roots = roots;
        Ok(tree)
    }

    fn insert_snapshot(&mut self, node: FieldNode) -> Result<FieldId, SchemaError> {
        if self.slots.contains_key(&node.id) {
            return Err(SchemaError::DuplicateId(node.id));
        }
        let FieldNode {
            id,
            key,
            kind,
            children,
        } = node;
        let keep_children = kind.is_nested() || self.policy == ChildrenPolicy::Retain;
        // Reserve the id before descending so a child cannot reuse it.
        self.slots.insert(
            id.clone(),
            FieldSlot {
                key,
                kind,
                children: Vec::new(),
            },
        );
        let mut child_ids = Vec::new();
        if keep_children {
            for child in children.unwrap_or_default() {
                child_ids.push(self.insert_snapshot(child)?);
            }
        }
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.children = child_ids;
        }
        Ok(id)
    }

    pub fn policy(&self) -> ChildrenPolicy {
        self.policy
    }

    /// Number of fields held by the arena, including retained hidden ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn roots(&self) -> &[FieldId] {
        self.roots.as_slice()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Id of the field at `path`, or `None` when the path does not address a
    /// visible field.
    pub fn resolve(&self, path: &FieldPath) -> Option<FieldId> {
        let (last, parents) = path.indices().split_last()?;
        let siblings = self.sequence(&FieldPath::new(parents.to_vec()))?;
        siblings.get(*last).cloned()
    }

    /// Path of a visible field, found with one traversal of the tree.
    pub fn path_of(&self, id: &str) -> Option<FieldPath> {
        let mut stack: Vec<(FieldPath, &FieldId)> = self
            .roots
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, child)| (FieldPath::new(vec![idx]), child))
            .collect();
        while let Some((path, current)) = stack.pop() {
            if current.as_str() == id {
                return Some(path);
            }
            let Some(slot) = self.slots.get(current) else {
                continue;
            };
            if !slot.kind.is_nested() {
                continue;
            }
            for (idx, child) in slot.children.iter().enumerate().rev() {
                stack.push((path.child(idx), child));
            }
        }
        None
    }

    pub fn get(&self, path: &FieldPath) -> Option<FieldNode> {
        let id = self.resolve(path)?;
        self.node_snapshot(id.as_str())
    }

    pub fn get_by_id(&self, id: &str) -> Option<FieldNode> {
        self.path_of(id)?;
        self.node_snapshot(id)
    }

    pub fn snapshot(&self) -> Vec<FieldNode> {
        self.roots
            .iter()
            .filter_map(|id| self.node_snapshot(id.as_str()))
            .collect()
    }

    fn node_snapshot(&self, id: &str) -> Option<FieldNode> {
        let (id, slot) = self.slots.get_key_value(id)?;
        let children = slot.kind.is_nested().then(|| {
            slot.children
                .iter()
                .filter_map(|child| self.node_snapshot(child.as_str()))
                .collect()
        });
        Some(FieldNode {
            id: id.clone(),
            key: slot.key.clone(),
            kind: slot.kind,
            children,
        })
    }

    fn sequence(&self, parent: &FieldPath) -> Option<&Vec<FieldId>> {
        if parent.is_root() {
            return Some(&self.roots);
        }
        let id = self.resolve(parent)?;
        let slot = self.slots.get(&id)?;
        slot.kind.is_nested().then_some(&slot.children)
    }

    fn sequence_mut(&mut self, parent: &FieldPath) -> Option<&mut Vec<FieldId>> {
        if parent.is_root() {
            return Some(&mut self.roots);
        }
        let id = self.resolve(parent)?;
        let slot = self.slots.get_mut(&id)?;
        if !slot.kind.is_nested() {
            return None;
        }
        Some(&mut slot.children)
    }

    fn fresh_id(&self) -> FieldId {
        loop {
            let id = FieldId::generate();
            if !self.slots.contains_key(&id) {
                return id;
            }
        }
    }

    /// Appends a default field (`key = ""`, `string`) to the sequence at
    /// `parent`. Returns `None` without touching the tree when `parent` is
    /// neither the root nor a visible `nested` field.
    pub fn add_field(&mut self, parent: &FieldPath) -> Option<FieldId> {
        self.sequence(parent)?;
        let id = self.fresh_id();
        self.slots.insert(
            id.clone(),
            FieldSlot {
                key: String::new(),
                kind: FieldKind::String,
                children: Vec::new(),
            },
        );
        self.sequence_mut(parent)?.push(id.clone());
        Some(id)
    }

    /// Detaches the field at `path` together with its whole subtree and
    /// returns its last snapshot. Unresolvable paths are a no-op.
    pub fn remove_field(&mut self, path: &FieldPath) -> Option<FieldNode> {
        let index = path.last_index()?;
        let parent = path.parent()?;
        let siblings = self.sequence_mut(&parent)?;
        if index >= siblings.len() {
            return None;
        }
        let id = siblings.remove(index);
        let removed = self.node_snapshot(id.as_str());
        self.drop_subtree(id);
        removed
    }

    fn drop_subtree(&mut self, id: FieldId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(slot) = self.slots.swap_remove(&next) {
                pending.extend(slot.children);
            }
        }
    }

    /// Replaces the key of the field at `path`. No format or uniqueness
    /// checks. Returns `false` when the path does not resolve.
    pub fn update_key(&mut self, path: &FieldPath, key: impl Into<String>) -> bool {
        let Some(id) = self.resolve(path) else {
            return false;
        };
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };
        slot.key = key.into();
        true
    }

    /// Replaces the type tag of the field at `path`, applying the children
    /// policy when the field stops being `nested`. Returns `false` when the
    /// path does not resolve.
    pub fn update_type(&mut self, path: &FieldPath, kind: FieldKind) -> bool {
        let Some(id) = self.resolve(path) else {
            return false;
        };
        let policy = self.policy;
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };
        let leaves_nested = slot.kind.is_nested() && !kind.is_nested();
        let dropped = if leaves_nested && policy == ChildrenPolicy::Discard {
            std::mem::take(&mut slot.children)
        } else {
            Vec::new()
        };
        slot.kind = kind;
        for child in dropped {
            self.drop_subtree(child);
        }
        true
    }
}
