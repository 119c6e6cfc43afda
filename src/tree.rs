use crate::{
    Extras, ITokenIndex, PhraseRef, SyntaxTree, TagImpl, TokenArena, TokenData, TokenKey,
    TokenKind, TokenRef,
};

impl<TTag: TagImpl> TokenArena<TTag> {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn get(&self, key: TokenKey) -> &TokenData<TTag> {
        &self.items[key.0]
    }

    fn get_mut(&mut self, key: TokenKey) -> &mut TokenData<TTag> {
        &mut self.items[key.0]
    }

    fn push(&mut self, data: TokenData<TTag>) -> TokenKey {
        let key = TokenKey(self.items.len());
        self.items.push(data);
        key
    }

    /// Create the root node together with its open end slot.
    pub(crate) fn push_root(&mut self, phrase: PhraseRef<TTag>) -> TokenKey {
        let root = TokenKey(self.items.len());
        self.push(TokenData {
            kind: TokenKind::Root,
            tag: TTag::root(),
            at: 0,
            to: 0,
            viewpoint: 0,
            row_no: 0,
            content: String::new(),
            node: root,
            slot: 0,
            phrase: Some(phrase),
            inner: Vec::new(),
            end: None,
            extras: Extras::default(),
        });
        let end = self.push(TokenData {
            kind: TokenKind::OpenEnd,
            tag: TTag::eof(),
            at: 0,
            to: 0,
            viewpoint: 0,
            row_no: 0,
            content: String::new(),
            node: root,
            slot: 0,
            phrase: None,
            inner: Vec::new(),
            end: None,
            extras: Extras::default(),
        });
        self.get_mut(root).end = Some(end);
        root
    }

    pub(crate) fn push_plain(
        &mut self,
        tag: TTag,
        at: usize,
        to: usize,
        viewpoint: usize,
        row_no: usize,
        content: String,
        parent: TokenKey,
    ) -> TokenKey {
        let slot = self.get(parent).inner.len();
        let key = self.push(TokenData {
            kind: TokenKind::Plain,
            tag,
            at,
            to,
            viewpoint,
            row_no,
            content,
            node: parent,
            slot,
            phrase: None,
            inner: Vec::new(),
            end: None,
            extras: Extras::default(),
        });
        self.get_mut(parent).inner.push(key);
        key
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn push_node(
        &mut self,
        tag: TTag,
        at: usize,
        to: usize,
        viewpoint: usize,
        row_no: usize,
        content: String,
        parent: TokenKey,
        phrase: PhraseRef<TTag>,
        extras: Extras,
    ) -> TokenKey {
        let slot = self.get(parent).inner.len();
        let key = self.push(TokenData {
            kind: TokenKind::Node,
            tag,
            at,
            to,
            viewpoint,
            row_no,
            content,
            node: parent,
            slot,
            phrase: Some(phrase),
            inner: Vec::new(),
            end: None,
            extras,
        });
        let end = self.push(TokenData {
            kind: TokenKind::OpenEnd,
            tag: TTag::eof(),
            at: 0,
            to: 0,
            viewpoint: 0,
            row_no,
            content: String::new(),
            node: key,
            slot: 0,
            phrase: None,
            inner: Vec::new(),
            end: None,
            extras: Extras::default(),
        });
        self.get_mut(key).end = Some(end);
        self.get_mut(parent).inner.push(key);
        key
    }

    /// Replace the open end slot of a node with the observed end token, in place.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn close_node(
        &mut self,
        end_key: TokenKey,
        tag: TTag,
        at: usize,
        to: usize,
        viewpoint: usize,
        row_no: usize,
        content: String,
    ) {
        let data = self.get_mut(end_key);
        data.kind = TokenKind::End;
        data.tag = tag;
        data.at = at;
        data.to = to;
        data.viewpoint = viewpoint;
        data.row_no = row_no;
        data.content = content;
    }

    /// Turn the open end slot of a still-open node into an end-of-input sentinel
    /// positioned at the deep tail of the node's last committed token.
    pub(crate) fn seal_eof(&mut self, end_key: TokenKey) {
        let node = self.get(end_key).node;
        let last = match self.get(node).inner.last() {
            Some(key) => self.deep_tail(*key),
            None => node,
        };
        let (to, viewpoint, row_no) = {
            let t = self.get(last);
            (t.to, t.viewpoint, t.row_no)
        };
        let data = self.get_mut(end_key);
        data.kind = TokenKind::Eof;
        data.tag = TTag::eof();
        data.at = to;
        data.to = to;
        data.viewpoint = viewpoint;
        data.row_no = row_no;
        data.content = String::new();
    }

    fn deep_tail(&self, mut key: TokenKey) -> TokenKey {
        while self.get(key).kind == TokenKind::Node {
            key = self.get(key).end.expect("nodes always carry an end slot");
        }
        key
    }

    pub(crate) fn set_phrase(&mut self, node: TokenKey, phrase: PhraseRef<TTag>) {
        self.get_mut(node).phrase = Some(phrase);
    }

    pub(crate) fn take_extras(&mut self, node: TokenKey) -> Extras {
        std::mem::take(&mut self.get_mut(node).extras)
    }

    pub(crate) fn put_extras(&mut self, node: TokenKey, extras: Extras) {
        self.get_mut(node).extras = extras;
    }

    pub(crate) fn set_content(&mut self, key: TokenKey, content: String) {
        let data = self.get_mut(key);
        data.to = data.at + content.len();
        data.content = content;
    }

    pub(crate) fn shift_viewpoint(&mut self, key: TokenKey, diff: isize) {
        let data = self.get_mut(key);
        data.viewpoint = (data.viewpoint as isize + diff) as usize;
    }

    /// Number of tokens in the arena (sentinels included).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn kind(&self, key: TokenKey) -> TokenKind {
        self.get(key).kind
    }

    pub fn tag(&self, key: TokenKey) -> TTag {
        self.get(key).tag
    }

    pub fn content(&self, key: TokenKey) -> &str {
        &self.get(key).content
    }

    pub fn row_no(&self, key: TokenKey) -> usize {
        let t = self.get(key);
        match t.kind {
            TokenKind::OpenEnd => self.get(self.last_token_of(t.node)).row_no,
            _ => t.row_no,
        }
    }

    /// The row position the token was bound to; columns are `viewpoint + at/to`.
    pub fn viewpoint(&self, key: TokenKey) -> usize {
        let t = self.get(key);
        match t.kind {
            TokenKind::OpenEnd => self.get(self.last_token_of(t.node)).viewpoint,
            _ => t.viewpoint,
        }
    }

    pub fn column_start(&self, key: TokenKey) -> usize {
        let t = self.get(key);
        match t.kind {
            TokenKind::OpenEnd => {
                let last = self.get(self.last_token_of(t.node));
                last.viewpoint + last.to
            }
            _ => t.viewpoint + t.at,
        }
    }

    pub fn column_end(&self, key: TokenKey) -> usize {
        let t = self.get(key);
        match t.kind {
            TokenKind::OpenEnd => self.column_start(key),
            _ => t.viewpoint + t.to,
        }
    }

    /// The owning node of a token; the root node owns itself.
    pub fn node_of(&self, key: TokenKey) -> TokenKey {
        self.get(key).node
    }

    /// The end slot of a node.
    pub fn end_of(&self, key: TokenKey) -> Option<TokenKey> {
        self.get(key).end
    }

    /// Direct inner tokens of a node (empty for other kinds).
    pub fn inner(&self, key: TokenKey) -> &[TokenKey] {
        &self.get(key).inner
    }

    pub fn phrase_of(&self, key: TokenKey) -> Option<&PhraseRef<TTag>> {
        self.get(key).phrase.as_ref()
    }

    pub(crate) fn phrase(&self, node: TokenKey) -> &PhraseRef<TTag> {
        self.get(node)
            .phrase
            .as_ref()
            .expect("nodes always carry a phrase")
    }

    pub fn extras(&self, key: TokenKey) -> &Extras {
        &self.get(key).extras
    }

    pub(crate) fn end_key(&self, node: TokenKey) -> TokenKey {
        self.get(node).end.expect("nodes always carry an end slot")
    }

    /// The last inner token of a node, or the node itself when it has none.
    fn last_token_of(&self, node: TokenKey) -> TokenKey {
        match self.get(node).inner.last() {
            Some(key) => *key,
            None => node,
        }
    }

    /// Document-order successor (node starts descend into their branch; end tokens
    /// resume behind their node). [None] past the end of input.
    pub fn next_linear(&self, key: TokenKey) -> Option<TokenKey> {
        let t = self.get(key);
        match t.kind {
            TokenKind::Node | TokenKind::Root => match t.inner.first() {
                Some(first) => Some(*first),
                None => t.end,
            },
            TokenKind::Plain => self.after_in_parent(key),
            TokenKind::End | TokenKind::OpenEnd | TokenKind::Eof => {
                if self.get(t.node).kind == TokenKind::Root {
                    None
                } else {
                    self.after_in_parent(t.node)
                }
            }
        }
    }

    /// Document-order predecessor. [None] before the root node.
    pub fn prev_linear(&self, key: TokenKey) -> Option<TokenKey> {
        let t = self.get(key);
        match t.kind {
            TokenKind::Root => None,
            TokenKind::End | TokenKind::OpenEnd | TokenKind::Eof => {
                match self.get(t.node).inner.last() {
                    Some(last) => Some(self.tail_of(*last)),
                    None => Some(t.node),
                }
            }
            _ => {
                if t.slot > 0 {
                    let before = self.get(t.node).inner[t.slot - 1];
                    Some(self.tail_of(before))
                } else {
                    Some(t.node)
                }
            }
        }
    }

    fn after_in_parent(&self, key: TokenKey) -> Option<TokenKey> {
        let t = self.get(key);
        let parent = self.get(t.node);
        if t.slot + 1 < parent.inner.len() {
            Some(parent.inner[t.slot + 1])
        } else {
            parent.end
        }
    }

    fn tail_of(&self, key: TokenKey) -> TokenKey {
        let t = self.get(key);
        if t.kind == TokenKind::Node {
            t.end.expect("nodes always carry an end slot")
        } else {
            key
        }
    }
}

impl<TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default> SyntaxTree<TTag, TIdx> {
    /// The root node of the result.
    pub fn root(&self) -> TokenRef<'_, TTag, TIdx> {
        TokenRef {
            tree: self,
            key: self.root,
        }
    }

    /// View of the token at `key`.
    pub fn get(&self, key: TokenKey) -> TokenRef<'_, TTag, TIdx> {
        TokenRef { tree: self, key }
    }

    /// The arena holding the token data.
    pub fn arena(&self) -> &TokenArena<TTag> {
        &self.arena
    }

    /// The token index built while parsing.
    pub fn index(&self) -> &TIdx {
        &self.index
    }

    /// Concatenated content of the whole result; equals the parsed input.
    pub fn content(&self) -> String {
        self.root().branch().map(|t| t.content().to_string()).collect()
    }

    /// The token covering the given row/column coordinate, resolved through the index.
    pub fn token_at_coord(&self, row_no: usize, col_no: usize) -> Option<TokenRef<'_, TTag, TIdx>> {
        self.index
            .token_at_coord(&self.arena, row_no, col_no)
            .map(|key| self.get(key))
    }

    /// The token covering the given absolute data offset, resolved through the index.
    pub fn token_at_cursor(&self, cursor: usize) -> Option<TokenRef<'_, TTag, TIdx>> {
        self.index
            .token_at_cursor(&self.arena, cursor)
            .map(|key| self.get(key))
    }

    /// Replace the content of the token at `key`.
    ///
    /// With `reindex` (the default choice for consistent coordinates) all following
    /// tokens of the same row are shifted by the length difference and the index's
    /// cached offsets from that row on are invalidated. The new content is trusted; it
    /// is neither checked nor parsed.
    pub fn replace_content(&mut self, key: TokenKey, content: impl Into<String>, reindex: bool) {
        let kind = self.arena.kind(key);
        if matches!(kind, TokenKind::OpenEnd | TokenKind::Eof) {
            panic!("{:?} tokens should not contain any content", kind);
        }
        let content = content.into();
        if reindex {
            let diff = content.len() as isize - self.arena.content(key).len() as isize;
            if diff != 0 {
                let row_no = self.arena.row_no(key);
                let mut cursor = self.arena.next_linear(key);
                while let Some(next) = cursor {
                    if self.arena.row_no(next) != row_no {
                        break;
                    }
                    self.arena.shift_viewpoint(next, diff);
                    cursor = self.arena.next_linear(next);
                }
                self.index.invalidate_rows(row_no);
            }
        }
        self.arena.set_content(key, content);
    }
}
