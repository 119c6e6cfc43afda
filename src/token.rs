use crate::{
    Extras, ITokenIndex, NodePath, PhraseRef, TagImpl, TokenKey, TokenKind, TokenReader, TokenRef,
};
use ptree::TreeItem;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

impl Extras {
    /// Store a value under `key`, replacing a previous value of the same key.
    pub fn set<V: 'static>(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let value: Rc<dyn Any> = Rc::new(value);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Typed read of the value stored under `key`.
    pub fn get<V: 'static>(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.downcast_ref::<V>())
    }

    /// Shortcut for string values.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get::<String>(key).map(|s| s.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Debug for Extras {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> Clone for TokenRef<'t, TTag, TIdx> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> Copy for TokenRef<'t, TTag, TIdx> {}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> PartialEq for TokenRef<'t, TTag, TIdx> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && std::ptr::eq(self.tree, other.tree)
    }
}
impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> Eq for TokenRef<'t, TTag, TIdx> {}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> TokenRef<'t, TTag, TIdx> {
    /// Arena position of the token, usable with [get](crate::SyntaxTree::get) and
    /// [replace_content](crate::SyntaxTree::replace_content).
    pub fn key(&self) -> TokenKey {
        self.key
    }

    pub fn kind(&self) -> TokenKind {
        self.tree.arena.kind(self.key)
    }

    pub fn tag(&self) -> TTag {
        self.tree.arena.tag(self.key)
    }

    /// Content of the token.
    pub fn content(&self) -> &'t str {
        self.tree.arena.content(self.key)
    }

    /// Length of the token content in bytes.
    pub fn len_token(&self) -> usize {
        self.content().len()
    }

    /// Row number where the token is located (starting from 0).
    pub fn row_no(&self) -> usize {
        self.tree.arena.row_no(self.key)
    }

    /// Starting point of the token relative to the whole row.
    pub fn column_start(&self) -> usize {
        self.tree.arena.column_start(self.key)
    }

    /// Ending point of the token relative to the whole row.
    pub fn column_end(&self) -> usize {
        self.tree.arena.column_end(self.key)
    }

    /// Starting point of the token relative to the whole data.
    pub fn data_start(&self) -> usize {
        self.tree.index.data_start_of(&self.tree.arena, self.key)
    }

    /// Ending point of the token relative to the whole data.
    pub fn data_end(&self) -> usize {
        self.data_start() + self.len_token()
    }

    pub fn is_node(&self) -> bool {
        matches!(self.kind(), TokenKind::Node | TokenKind::Root)
    }

    pub fn is_end(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::End | TokenKind::OpenEnd | TokenKind::Eof
        )
    }

    /// The owning node: the parent for plain and node tokens, the closed node for end
    /// tokens. The root node is its own owner.
    pub fn node(&self) -> TokenRef<'t, TTag, TIdx> {
        TokenRef {
            tree: self.tree,
            key: self.tree.arena.node_of(self.key),
        }
    }

    /// The end token of a node ([None] for other kinds).
    pub fn end(&self) -> Option<TokenRef<'t, TTag, TIdx>> {
        self.tree
            .arena
            .end_of(self.key)
            .map(|key| TokenRef { tree: self.tree, key })
    }

    /// The phrase a node was committed by ([None] for non-node tokens).
    pub fn phrase(&self) -> Option<&'t PhraseRef<TTag>> {
        self.tree.arena.phrase_of(self.key)
    }

    /// Extras of a node (empty for non-node tokens).
    pub fn extras(&self) -> &'t Extras {
        self.tree.arena.extras(self.key)
    }

    /// Number of direct inner tokens of a node.
    pub fn len_items(&self) -> usize {
        self.tree.arena.inner(self.key).len()
    }

    /// Direct inner token at `index`.
    pub fn get_item(&self, index: usize) -> Option<TokenRef<'t, TTag, TIdx>> {
        self.tree
            .arena
            .inner(self.key)
            .get(index)
            .map(|key| TokenRef { tree: self.tree, key: *key })
    }

    /// Iterate the direct inner tokens of a node (no recursion, end token excluded).
    pub fn items(&self) -> impl Iterator<Item = TokenRef<'t, TTag, TIdx>> {
        let tree = self.tree;
        tree.arena
            .inner(self.key)
            .iter()
            .map(move |key| TokenRef { tree, key: *key })
    }

    /// The next token on the one-dimensional plane, [None] past the end of input.
    pub fn next_token(&self) -> Option<TokenRef<'t, TTag, TIdx>> {
        self.tree
            .arena
            .next_linear(self.key)
            .map(|key| TokenRef { tree: self.tree, key })
    }

    /// The previous token on the one-dimensional plane, [None] before the root.
    pub fn previous_token(&self) -> Option<TokenRef<'t, TTag, TIdx>> {
        self.tree
            .arena
            .prev_linear(self.key)
            .map(|key| TokenRef { tree: self.tree, key })
    }

    /// Reader over every token strictly after this one, in document order, through the
    /// end of input.
    pub fn thereafter(&self) -> TokenReader<'t, TTag, TIdx> {
        TokenReader::thereafter(*self)
    }

    /// Reader over every token strictly before this one, in document order, from the
    /// root node on.
    pub fn therebefore(&self) -> TokenReader<'t, TTag, TIdx> {
        TokenReader::therebefore(*self)
    }

    /// Reader over every descendant token of a node (flattened; excludes the node and
    /// its end token).
    pub fn inner(&self) -> TokenReader<'t, TTag, TIdx> {
        TokenReader::inner(*self)
    }

    /// Reader over the node, its flattened descendants and its end token.
    pub fn branch(&self) -> TokenReader<'t, TTag, TIdx> {
        TokenReader::branch(*self)
    }

    /// The structure path from the root node to this node, inclusive.
    pub fn node_path(&self) -> NodePath<'t, TTag, TIdx> {
        NodePath::new(*self)
    }

    /// Length of all content within a branch, this node and its end excluded.
    pub fn len_inner(&self) -> usize {
        self.inner().map(|t| t.len_token()).sum()
    }

    /// Length of all content within a branch, this node and its end included.
    pub fn len_branch(&self) -> usize {
        self.branch().map(|t| t.len_token()).sum()
    }

    /// Search this branch for the first token matching the predicate.
    pub fn find<F: Fn(&TokenRef<'t, TTag, TIdx>) -> bool>(
        &self,
        f: F,
    ) -> Option<TokenRef<'t, TTag, TIdx>> {
        self.branch().find(|t| f(t))
    }
}

impl<'t, TTag: TagImpl + PartialEq, TIdx: ITokenIndex<TTag> + Default> TokenRef<'t, TTag, TIdx> {
    /// Search this branch for the first token with the given tag.
    pub fn find_tag(&self, tag: TTag) -> Option<TokenRef<'t, TTag, TIdx>> {
        self.find(|t| t.tag() == tag)
    }

    /// Whether any token of this branch carries the given tag.
    pub fn contains_tag(&self, tag: TTag) -> bool {
        self.find_tag(tag).is_some()
    }
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> Display for TokenRef<'t, TTag, TIdx> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content())
    }
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> Debug for TokenRef<'t, TTag, TIdx> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug_struct = f.debug_struct("Token");
        debug_struct
            .field("tag", &self.tag())
            .field("kind", &self.kind())
            .field("row", &self.row_no())
            .field("column", &(self.column_start()..self.column_end()))
            .field("content", &self.content());
        if self.is_node() && self.len_items() > 0 {
            debug_struct.field("items", &self.len_items());
        }
        debug_struct.finish()
    }
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> TreeItem for TokenRef<'t, TTag, TIdx> {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(
            f,
            "{:?} # {}:{}-{} {:?}",
            self.tag(),
            self.row_no(),
            self.column_start(),
            self.column_end(),
            self.content()
        )
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        if self.is_node() {
            let mut children: Vec<Self> = self.items().collect();
            if let Some(end) = self.end() {
                children.push(end);
            }
            std::borrow::Cow::from(children)
        } else {
            std::borrow::Cow::from(Vec::with_capacity(0))
        }
    }
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> TokenRef<'t, TTag, TIdx> {
    /// Render the branch of this token to stdout.
    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}
