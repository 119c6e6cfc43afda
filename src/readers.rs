use crate::{ExtensiveTokenIndex, ITokenIndex, SyntaxTree, TagImpl, TokenKey, TokenKind, TokenRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderContext {
    Thereafter,
    Therebefore,
    Inner,
    Branch,
}

/// An iterator through tokens on the one-dimensional plane of a [SyntaxTree].
///
/// Obtained from the context methods of [TokenRef] ([thereafter](TokenRef::thereafter),
/// [therebefore](TokenRef::therebefore), [inner](TokenRef::inner),
/// [branch](TokenRef::branch)). A reader is an explicit cursor over the document order;
/// [reversed](TokenReader::reversed) restarts the same context from the other side.
/// Iteration past the end of input simply yields [None].
pub struct TokenReader<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default = ExtensiveTokenIndex>
{
    tree: &'t SyntaxTree<TTag, TIdx>,
    anchor: TokenKey,
    context: ReaderContext,
    reverse: bool,
    cursor: Option<TokenKey>,
    until: Option<TokenKey>,
    inclusive: bool,
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> TokenReader<'t, TTag, TIdx> {
    fn with(
        anchor: TokenRef<'t, TTag, TIdx>,
        context: ReaderContext,
        reverse: bool,
    ) -> Self {
        let tree = anchor.tree;
        let arena = &tree.arena;
        let key = anchor.key;
        let is_node = matches!(arena.kind(key), TokenKind::Node | TokenKind::Root);

        let (cursor, until, inclusive) = match (context, reverse) {
            (ReaderContext::Thereafter, false) => (arena.next_linear(key), None, false),
            (ReaderContext::Thereafter, true) => {
                let root_end = arena.end_key(tree.root);
                if root_end == key {
                    (None, None, false)
                } else {
                    (Some(root_end), Some(key), false)
                }
            }
            (ReaderContext::Therebefore, false) => {
                if key == tree.root {
                    (None, None, false)
                } else {
                    (Some(tree.root), Some(key), false)
                }
            }
            (ReaderContext::Therebefore, true) => (arena.prev_linear(key), None, false),
            (ReaderContext::Inner, false) => {
                if is_node {
                    (
                        arena.inner(key).first().copied(),
                        Some(arena.end_key(key)),
                        false,
                    )
                } else {
                    (None, None, false)
                }
            }
            (ReaderContext::Inner, true) => {
                if is_node && !arena.inner(key).is_empty() {
                    (arena.prev_linear(arena.end_key(key)), Some(key), false)
                } else {
                    (None, None, false)
                }
            }
            (ReaderContext::Branch, false) => {
                if is_node {
                    (Some(key), Some(arena.end_key(key)), true)
                } else {
                    (Some(key), Some(key), true)
                }
            }
            (ReaderContext::Branch, true) => {
                if is_node {
                    (Some(arena.end_key(key)), Some(key), true)
                } else {
                    (Some(key), Some(key), true)
                }
            }
        };

        Self {
            tree,
            anchor: key,
            context,
            reverse,
            cursor,
            until,
            inclusive,
        }
    }

    pub(crate) fn thereafter(anchor: TokenRef<'t, TTag, TIdx>) -> Self {
        Self::with(anchor, ReaderContext::Thereafter, false)
    }

    pub(crate) fn therebefore(anchor: TokenRef<'t, TTag, TIdx>) -> Self {
        Self::with(anchor, ReaderContext::Therebefore, false)
    }

    pub(crate) fn inner(anchor: TokenRef<'t, TTag, TIdx>) -> Self {
        Self::with(anchor, ReaderContext::Inner, false)
    }

    pub(crate) fn branch(anchor: TokenRef<'t, TTag, TIdx>) -> Self {
        Self::with(anchor, ReaderContext::Branch, false)
    }

    /// The same context, iterated from the other side.
    pub fn reversed(&self) -> Self {
        Self::with(
            TokenRef {
                tree: self.tree,
                key: self.anchor,
            },
            self.context,
            !self.reverse,
        )
    }

    /// Concatenated content of the tokens in this reader's context.
    pub fn content(self) -> String {
        self.map(|t| t.content().to_string()).collect()
    }
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> Iterator
    for TokenReader<'t, TTag, TIdx>
{
    type Item = TokenRef<'t, TTag, TIdx>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        if Some(key) == self.until {
            self.cursor = None;
            return if self.inclusive {
                Some(TokenRef {
                    tree: self.tree,
                    key,
                })
            } else {
                None
            };
        }
        self.cursor = if self.reverse {
            self.tree.arena.prev_linear(key)
        } else {
            self.tree.arena.next_linear(key)
        };
        Some(TokenRef {
            tree: self.tree,
            key,
        })
    }
}

/// An iterator through the structure path from the root node to an anchor node,
/// inclusive.
pub struct NodePath<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default = ExtensiveTokenIndex> {
    tree: &'t SyntaxTree<TTag, TIdx>,
    path: Vec<TokenKey>,
    pos: usize,
    reverse: bool,
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> NodePath<'t, TTag, TIdx> {
    pub(crate) fn new(anchor: TokenRef<'t, TTag, TIdx>) -> Self {
        let tree = anchor.tree;
        let arena = &tree.arena;
        // anchor itself when it is a node, its owning node otherwise
        let mut key = match arena.kind(anchor.key) {
            TokenKind::Node | TokenKind::Root => anchor.key,
            _ => arena.node_of(anchor.key),
        };
        let mut path = vec![key];
        while arena.kind(key) != TokenKind::Root {
            key = arena.node_of(key);
            path.push(key);
        }
        path.reverse();
        Self {
            tree,
            path,
            pos: 0,
            reverse: false,
        }
    }

    /// The same path, anchor first.
    pub fn reversed(&self) -> Self {
        Self {
            tree: self.tree,
            path: self.path.clone(),
            pos: 0,
            reverse: !self.reverse,
        }
    }
}

impl<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> Iterator for NodePath<'t, TTag, TIdx> {
    type Item = TokenRef<'t, TTag, TIdx>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.path.len() {
            return None;
        }
        let index = if self.reverse {
            self.path.len() - 1 - self.pos
        } else {
            self.pos
        };
        self.pos += 1;
        Some(TokenRef {
            tree: self.tree,
            key: self.path[index],
        })
    }
}
