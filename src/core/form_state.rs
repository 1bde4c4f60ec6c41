use std::fmt;

use crate::config::BuilderConfig;
use crate::core::FieldId;
use crate::core::error::SchemaError;
use crate::core::field::{FieldKind, FieldNode};
use crate::core::field_path::FieldPath;
use crate::core::field_tree::FieldTree;
use crate::core::preview::{self, Preview};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// What observers see after a committed edit. Everything is a snapshot taken
/// after the edit finished.
#[derive(Debug, Clone, Copy)]
pub struct PreviewUpdate<'a> {
    pub revision: u64,
    pub fields: &'a [FieldNode],
    pub preview: &'a Preview,
    pub json: &'a str,
}

pub type PreviewObserver = Box<dyn FnMut(&PreviewUpdate<'_>)>;

/// Authoritative owner of the field tree. Each successful edit recomputes the
/// snapshot and preview before returning, then notifies observers in
/// subscription order.
pub struct FormState {
    tree: FieldTree,
    indent: usize,
    revision: u64,
    fields: Vec<FieldNode>,
    preview: Preview,
    preview_json: String,
    observers: Vec<(SubscriptionId, PreviewObserver)>,
    next_subscription: u64,
}

impl FormState {
    /// Seeds from `initial_data`. Without it the form starts with one default
    /// field unless the config turns that off.
    pub fn new(
        initial_data: Option<Vec<FieldNode>>,
        config: &BuilderConfig,
    ) -> Result<Self, SchemaError> {
        let tree = match initial_data {
            Some(nodes) => FieldTree::from_nodes(nodes, config.children_policy)?,
            None => {
                let mut tree = FieldTree::new(config.children_policy);
                if config.default_field {
                    tree.add_field(&FieldPath::root());
                }
                tree
            }
        };
        Ok(Self::from_tree(tree, config.preview_indent))
    }

    fn from_tree(tree: FieldTree, indent: usize) -> Self {
        let mut state = Self {
            tree,
            indent,
            revision: 0,
            fields: Vec::new(),
            preview: Preview::default(),
            preview_json: String::new(),
            observers: Vec::new(),
            next_subscription: 0,
        };
        state.recompute();
        state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tree(&self) -> &FieldTree {
        &self.tree
    }

    /// Current ordered snapshot of the tree.
    pub fn fields(&self) -> &[FieldNode] {
        self.fields.as_slice()
    }

    pub fn field(&self, path: &FieldPath) -> Option<FieldNode> {
        self.tree.get(path)
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn preview_json(&self) -> &str {
        self.preview_json.as_str()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&PreviewUpdate<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn add_field(&mut self, parent: &FieldPath) -> Option<FieldId> {
        let id = self.tree.add_field(parent)?;
        self.commit();
        Some(id)
    }

    pub fn remove_field(&mut self, path: &FieldPath) -> Option<FieldNode> {
        let removed = self.tree.remove_field(path)?;
        self.commit();
        Some(removed)
    }

    pub fn update_key(&mut self, path: &FieldPath, key: impl Into<String>) -> bool {
        if !self.tree.update_key(path, key) {
            return false;
        }
        self.commit();
        true
    }

    /// Parses `tag` before touching anything, so an unknown type leaves the
    /// form unchanged. `Ok(false)` means the path did not resolve.
    pub fn update_type(&mut self, path: &FieldPath, tag: &str) -> Result<bool, SchemaError> {
        let kind = tag.parse::<FieldKind>()?;
        Ok(self.set_type(path, kind))
    }

    pub fn set_type(&mut self, path: &FieldPath, kind: FieldKind) -> bool {
        if !self.tree.update_type(path, kind) {
            return false;
        }
        self.commit();
        true
    }

    fn recompute(&mut self) {
        self.fields = self.tree.snapshot();
        self.preview = preview::project(&self.fields);
        self.preview_json = preview::render_json(&self.preview, self.indent);
    }

    fn commit(&mut self) {
        self.revision += 1;
        self.recompute();
        let update = PreviewUpdate {
            revision: self.revision,
            fields: &self.fields,
            preview: &self.preview,
            json: &self.preview_json,
        };
        for (_, observer) in self.observers.iter_mut() {
            observer(&update);
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        let config = BuilderConfig::default();
        let mut tree = FieldTree::new(config.children_policy);
        tree.add_field(&FieldPath::root());
        Self::from_tree(tree, config.preview_indent)
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("revision", &self.revision)
            .field("fields", &self.fields)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::FormState;
    use crate::config::BuilderConfig;
    use crate::core::error::SchemaError;
    use crate::core::field::{FieldKind, FieldNode};
    use crate::core::field_path::FieldPath;

    fn root() -> FieldPath {
        FieldPath::root()
    }

    #[test]
    fn absent_initial_data_seeds_one_default_field() {
        let state = FormState::new(None, &BuilderConfig::default()).expect("state");
        assert_eq!(state.fields().len(), 1);
        assert_eq!(state.fields()[0].key, "");
        assert_eq!(state.fields()[0].kind, FieldKind::String);
        assert_eq!(state.preview_json(), "{\n  \"\": \"STRING\"\n}");
    }

    #[test]
    fn default_field_can_be_disabled() {
        let config = BuilderConfig {
            default_field: false,
            ..BuilderConfig::default()
        };
        let state = FormState::new(None, &config).expect("state");
        assert!(state.fields().is_empty());
        assert_eq!(state.preview_json(), "{}");
    }

    #[test]
    fn initial_data_is_used_verbatim() {
        let seed = vec![
            FieldNode::string("name").with_id("n"),
            FieldNode::number("age").with_id("a"),
        ];
        let state = FormState::new(Some(seed.clone()), &BuilderConfig::default()).expect("state");
        assert_eq!(state.fields(), seed.as_slice());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn duplicate_seed_ids_are_rejected() {
        let seed = vec![
            FieldNode::string("a").with_id("x"),
            FieldNode::string("b").with_id("x"),
        ];
        let err = FormState::new(Some(seed), &BuilderConfig::default()).expect_err("duplicate");
        assert_eq!(err, SchemaError::DuplicateId("x".into()));
    }

    #[test]
    fn preview_tracks_every_edit() {
        let mut state = FormState::new(Some(Vec::new()), &BuilderConfig::default()).expect("state");
        state.add_field(&root());
        state.update_key(&FieldPath::from([0]), "address");
        state.update_type(&FieldPath::from([0]), "nested").expect("type");
        assert_eq!(state.preview_json(), "{\n  \"address\": \"NESTED\"\n}");

        state.add_field(&FieldPath::from([0])).expect("child");
        state.update_key(&FieldPath::from([0, 0]), "city");
        assert_eq!(
            state.preview_json(),
            "{\n  \"address\": {\n    \"city\": \"STRING\"\n  }\n}"
        );
        assert_eq!(state.revision(), 5);
    }

    #[test]
    fn invalid_type_is_rejected_without_change() {
        let mut state = FormState::default();
        let before = state.fields().to_vec();
        let err = state.update_type(&FieldPath::from([0]), "bool").expect_err("invalid");
        assert_eq!(err, SchemaError::InvalidType("bool".to_string()));
        assert_eq!(state.fields(), before.as_slice());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn unresolved_paths_are_benign() {
        let mut state = FormState::default();
        assert!(state.remove_field(&FieldPath::from([3])).is_none());
        assert!(!state.update_key(&FieldPath::from([3]), "x"));
        assert_eq!(state.update_type(&FieldPath::from([3]), "number"), Ok(false));
        assert!(state.add_field(&FieldPath::from([0])).is_none());
        assert!(state.field(&FieldPath::from([3])).is_none());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn remove_twice_is_a_noop_the_second_time() {
        let mut state = FormState::default();
        state.add_field(&root());
        assert!(state.remove_field(&FieldPath::from([1])).is_some());
        let after_first = state.fields().to_vec();
        assert!(state.remove_field(&FieldPath::from([1])).is_none());
        assert_eq!(state.fields(), after_first.as_slice());
    }

    #[test]
    fn readding_same_key_gets_a_new_id() {
        let mut state = FormState::default();
        state.update_key(&FieldPath::from([0]), "name");
        let original = state.fields()[0].id.clone();
        state.remove_field(&FieldPath::from([0]));
        state.add_field(&root());
        state.update_key(&FieldPath::from([0]), "name");
        assert_ne!(state.fields()[0].id, original);
    }

    #[test]
    fn sibling_order_follows_insertion_after_mid_removal() {
        let mut state = FormState::new(Some(Vec::new()), &BuilderConfig::default()).expect("state");
        for key in ["first", "second", "third", "fourth"] {
            state.add_field(&root());
            let last = state.fields().len() - 1;
            state.update_key(&FieldPath::from([last]), key);
        }
        state.remove_field(&FieldPath::from([1]));
        let keys: Vec<_> = state.preview().keys().collect();
        assert_eq!(keys, vec!["first", "third", "fourth"]);
    }

    #[test]
    fn observers_see_committed_state_in_order() {
        let seen = Rc::new(RefCell::new(Vec::<(u64, String)>::new()));
        let mut state = FormState::default();
        let sink = Rc::clone(&seen);
        let id = state.subscribe(move |update| {
            sink.borrow_mut().push((update.revision, update.json.to_string()));
        });

        state.update_key(&FieldPath::from([0]), "age");
        state.set_type(&FieldPath::from([0]), FieldKind::Number);
        state.update_key(&FieldPath::from([9]), "ignored");

        {
            let seen = seen.borrow();
            assert_eq!(seen.len(), 2);
            assert_eq!(seen[0], (1, "{\n  \"age\": \"STRING\"\n}".to_string()));
            assert_eq!(seen[1], (2, "{\n  \"age\": \"NUMBER\"\n}".to_string()));
        }

        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.update_key(&FieldPath::from([0]), "years");
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn configured_indent_applies_to_preview() {
        let config = BuilderConfig {
            preview_indent: 4,
            ..BuilderConfig::default()
        };
        let state = FormState::new(Some(vec![FieldNode::number("n")]), &config).expect("state");
        assert_eq!(state.preview_json(), "{\n    \"n\": \"NUMBER\"\n}");
    }
}
