//! Phrase parsing tool (phrase_pt) is a library to build structural tokenizing parsers
//! which split text documents into content-faithful token trees ([SyntaxTree]).
//!
//! # Overview
//! Structured text such as source code, templates or markup rarely fits a single flat
//! lexer: strings appear inside code, expressions inside strings, brackets inside both.
//! Instead of a grammar, this library works with an open set of cooperating [phrases](Phrase).
//! A phrase is a user-supplied object that can recognize where a region of its kind
//! begins ([starts](IPhrase::starts)), where it ends ([ends](IPhrase::ends)), and how the
//! content in between is split into tokens ([tokenize](IPhrase::tokenize)).
//! The engine arbitrates the priority of the candidates returned by the phrases,
//! advances a single forward cursor over the document rows, and records every consumed
//! character in the result tree, so that concatenating the tree content always restores
//! the input exactly.
//!
//! # Design
//!
//! Phrases are connected into a graph: each phrase declares which phrases may begin
//! *inside* it (sub-phrases) and which may begin *immediately after* it ends
//! (suffix-phrases). The [Root] is the distinguished entry of the graph and drives the
//! parse. Candidate tokens can carry a [feature pipeline](Feat) of [FeatOp] operators
//! (left-strip, right-tokenize, phrase switches, forwarding) to reshape their designated
//! region or to restage the active phrase before they are committed, and a phrase can
//! blind the engine to a
//! region with a masking candidate ([Start::mask], [Start::mask_node]) without opening a
//! real branch. The committed result is navigated through reader views
//! ([thereafter](TokenRef::thereafter), [inner](TokenRef::inner), [branch](TokenRef::branch), ...)
//! and located through a row/offset index ([ExtensiveTokenIndex]).
//!
//! # Example
//!
//! A minimal recursive bracket parser:
//! ```
//! use phrase_pt::{End, IPhrase, Phrase, Root, Start, StreamView, TagImpl};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Tag {
//!     Content,
//!     Open,
//!     Close,
//!     Root,
//!     Eof,
//! }
//!
//! impl TagImpl for Tag {
//!     fn plain() -> Self { Tag::Content }
//!     fn root() -> Self { Tag::Root }
//!     fn eof() -> Self { Tag::Eof }
//! }
//!
//! struct BracketPhrase;
//!
//! impl IPhrase<Tag> for BracketPhrase {
//!     fn id(&self) -> &'static str { "bracket" }
//!
//!     fn starts(&self, stream: &StreamView) -> Option<Start<Tag>> {
//!         stream.unparsed().find('(').map(|i| Start::node(Tag::Open, i, i + 1))
//!     }
//!
//!     fn ends(&self, stream: &StreamView) -> Option<End<Tag>> {
//!         stream.unparsed().find(')').map(|i| End::new(Tag::Close, i, i + 1))
//!     }
//! }
//!
//! let root = Root::<Tag>::new();
//! let bracket = Phrase::new(BracketPhrase);
//! bracket.add_subs(&[&bracket]); // nested brackets
//! root.add_subs(&[&bracket]);
//!
//! let tree = root.parse_string("a(b(c)d)e").unwrap();
//! assert_eq!(tree.content(), "a(b(c)d)e");
//!
//! let node = tree.root().items().find(|t| t.tag() == Tag::Open).unwrap();
//! assert_eq!(node.content(), "(");
//! assert_eq!(node.end().unwrap().content(), ")");
//! ```
//!
//! # License
//! [phrase_pt](crate) is provided under the MIT license.

mod error;
mod feature;
mod impl_default;
mod index;
mod logger;
mod parser;
mod phrase;
mod readers;
mod stream;
mod token;
mod tree;

pub mod examples;

pub use index::{ExtensiveTokenIndex, ITokenIndex, NoneTokenIndex, RowRecord};
pub use readers::{NodePath, TokenReader};
pub use stream::{StreamView, TokenizeContext, TokenizeStream};

use once_cell::unsync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// A trait implementation to provide the token tag values the engine assigns on its own.
///
/// Committed tokens carry a user defined tag value ([TokenRef::tag]). Most tags are
/// chosen by phrase code when it creates candidates or tokenizes content, but the engine
/// needs three tags of its own: the default tag for content no phrase claimed
/// ([plain](TagImpl::plain)), the tag of the root node ([root](TagImpl::root)) and the
/// tag of the end-of-input sentinel ([eof](TagImpl::eof)).
///
/// Implementations for the primitive types [i8], [i16] and [i32] are provided for quick
/// prototyping.
pub trait TagImpl: Copy + Debug {
    /// Default tag for plain content tokens.
    fn plain() -> Self;
    /// Tag of the root node.
    fn root() -> Self;
    /// Tag of end-of-input sentinels.
    fn eof() -> Self;
}

/// An interface implemented by user phrase objects, the primary configuration unit of a
/// parser.
///
/// A phrase kernel is wrapped into a [Phrase] graph node with [Phrase::new]. During a
/// parse the engine queries [starts](IPhrase::starts) on every sub-phrase of the current
/// node and [ends](IPhrase::ends) on the current node's own phrase, arbitrates the
/// returned candidates and commits the winner.
///
/// `starts` and `ends` receive a read-only [StreamView]; they must not attempt to advance
/// the parse and should store per-branch state in the candidate's extras instead
/// ([Start::extra]).
pub trait IPhrase<TTag: TagImpl> {
    /// Identity of the phrase, used for debugging and error messages.
    fn id(&self) -> &'static str {
        "phrase"
    }

    /// Must return a potential node, standalone or masking candidate in the unparsed
    /// content of the current row ([StreamView::unparsed]), or [None] if the phrase does
    /// not apply. The candidate's `at`/`to` are byte offsets into the unparsed content.
    fn starts(&self, stream: &StreamView) -> Option<Start<TTag>>;

    /// Must return a potential end candidate for the current node in the unparsed
    /// content of the current row, or [None] if the phrase does not end here.
    fn ends(&self, stream: &StreamView) -> Option<End<TTag>> {
        let _ = stream;
        None
    }

    /// Whether [tokenize](IPhrase::tokenize) is implemented. When `false` (default) the
    /// engine skips the tokenize loop and emits a single token of
    /// [default_tag](IPhrase::default_tag) per designated region.
    fn has_tokenize(&self) -> bool {
        false
    }

    /// Dedicated allocation and typing of tokens within a designated region.
    ///
    /// Each call must advance the passed stream using its `eat_*` methods (the consumed
    /// characters become the content of one token) and return the tag for that token.
    /// The engine calls the method repeatedly until the region is exhausted.
    fn tokenize(&self, stream: &mut TokenizeStream) -> TTag {
        stream.eat_remain();
        self.default_tag()
    }

    /// Tag for content of this phrase which is emitted without a dedicated
    /// [tokenize](IPhrase::tokenize) pass.
    fn default_tag(&self) -> TTag {
        TTag::plain()
    }

    /// Callback invoked after a node of this phrase has been committed. May mutate the
    /// node's extras; must not attempt to advance the parse.
    fn at_start(&self, stream: &StreamView, extras: &mut Extras) {
        let _ = (stream, extras);
    }

    /// Callback invoked after a node of this phrase has been closed. May mutate the
    /// node's extras; must not attempt to advance the parse.
    fn at_end(&self, stream: &StreamView, extras: &mut Extras) {
        let _ = (stream, extras);
    }
}

/// A shared reference to a [Phrase] graph node.
pub type PhraseRef<TTag> = Rc<Phrase<TTag>>;

/// A graph node wrapping a user phrase kernel ([IPhrase]) together with its sub- and
/// suffix-phrase edges.
///
/// Phrases are shared configuration objects ([PhraseRef]); cyclic and self references
/// are permitted (a bracket phrase that contains itself, a suffix chain that repeats).
/// The edge sets must not be modified for phrases a parse is currently running through.
pub struct Phrase<TTag: TagImpl> {
    pub(crate) kernel: Rc<dyn IPhrase<TTag>>,
    pub(crate) subs: RefCell<Vec<PhraseRef<TTag>>>,
    pub(crate) suffixes: RefCell<Vec<PhraseRef<TTag>>>,
    pub(crate) log: OnceCell<Log<&'static str>>,
    pub(crate) this: OnceCell<Weak<Phrase<TTag>>>,
    pub(crate) is_root: bool,
}

impl<TTag: TagImpl> Debug for Phrase<TTag> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phrase")
            .field("id", &self.kernel.id())
            .field("is_root", &self.is_root)
            .finish()
    }
}

/// The distinguished top-level phrase; parsing entry of a phrase graph.
///
/// All phrase configuration is attached to the root with [add_subs](Root::add_subs).
/// The root's node is the result tree's root and is only closed by the end of input.
/// The index implementation recorded while parsing is chosen by the second type
/// parameter ([ExtensiveTokenIndex] by default, [NoneTokenIndex] to save the
/// bookkeeping).
pub struct Root<TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default = ExtensiveTokenIndex> {
    pub(crate) phrase: PhraseRef<TTag>,
    pub(crate) _index: PhantomData<TIdx>,
}

/// A wrapper to indicate the position of a token in the result tree's arena.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenKey(pub(crate) usize);

/// The variant of a committed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain content token.
    Plain,
    /// Node start token; owns inner tokens and an end slot.
    Node,
    /// Node end token.
    End,
    /// Placeholder in the end slot of a node whose end was not yet observed.
    OpenEnd,
    /// The root node.
    Root,
    /// End-of-input sentinel (replaces [OpenEnd](TokenKind::OpenEnd) at the end of the
    /// parse).
    Eof,
}

#[derive(Debug)]
pub(crate) struct TokenData<TTag: TagImpl> {
    pub(crate) kind: TokenKind,
    pub(crate) tag: TTag,
    pub(crate) at: usize,
    pub(crate) to: usize,
    pub(crate) viewpoint: usize,
    pub(crate) row_no: usize,
    pub(crate) content: String,
    /// Owning node: parent for plain and node tokens, the closed node for end tokens.
    pub(crate) node: TokenKey,
    /// Index within the owning node's inner list (meaningless for end tokens).
    pub(crate) slot: usize,
    pub(crate) phrase: Option<PhraseRef<TTag>>,
    pub(crate) inner: Vec<TokenKey>,
    pub(crate) end: Option<TokenKey>,
    pub(crate) extras: Extras,
}

/// Arena storage of the result tree; parent/child links are [TokenKey] indices.
#[derive(Debug)]
pub struct TokenArena<TTag: TagImpl> {
    pub(crate) items: Vec<TokenData<TTag>>,
}

/// The parsed result: the token arena, the root node and the token index built while
/// parsing.
#[derive(Debug)]
pub struct SyntaxTree<TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default = ExtensiveTokenIndex> {
    pub(crate) arena: TokenArena<TTag>,
    pub(crate) root: TokenKey,
    pub(crate) index: TIdx,
}

/// A lightweight view of one token in a [SyntaxTree].
pub struct TokenRef<'t, TTag: TagImpl, TIdx: ITokenIndex<TTag> + Default = ExtensiveTokenIndex> {
    pub(crate) tree: &'t SyntaxTree<TTag, TIdx>,
    pub(crate) key: TokenKey,
}

/// Dynamic additional information about a node.
///
/// An insertion-ordered small map from string keys to opaque values. The engine never
/// reads the values; phrase code does the typed reads ([get](Extras::get)). A node owns
/// its extras for its lifetime; `ends` implementations and the `at_start`/`at_end`
/// callbacks use them to recall per-branch state (e.g. which quote character opened a
/// string).
#[derive(Default, Clone)]
pub struct Extras {
    pub(crate) entries: Vec<(String, Rc<dyn Any>)>,
}

/// A start candidate returned by [IPhrase::starts]: a standalone token, a node start, an
/// instant variant of either, or a masking candidate.
pub struct Start<TTag: TagImpl> {
    pub(crate) shape: StartShape,
    pub(crate) instant: bool,
    pub(crate) at: usize,
    pub(crate) to: usize,
    pub(crate) tag: TTag,
    pub(crate) features: Feat<TTag>,
    pub(crate) extras: Extras,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartShape {
    Token,
    Node,
    Mask,
    MaskNode,
}

/// An end candidate returned by [IPhrase::ends].
pub struct End<TTag: TagImpl> {
    pub(crate) instant: bool,
    pub(crate) at: usize,
    pub(crate) to: usize,
    pub(crate) tag: TTag,
    pub(crate) features: Feat<TTag>,
}

/// An ordered feature pipeline attached to a candidate token.
///
/// Built by `|`-composition of [FeatOp] operators, or through the equivalent builder
/// methods on [Start] and [End]; executed around the commit of the candidate (see
/// [FeatOp] for the staging rules).
pub struct Feat<TTag: TagImpl> {
    pub(crate) left: Vec<StageOp<TTag>>,
    pub(crate) right: Vec<StageOp<TTag>>,
    pub(crate) right_width: usize,
    pub(crate) forward: Option<PhraseRef<TTag>>,
    pub(crate) staging_right: bool,
}

pub(crate) enum StageOp<TTag: TagImpl> {
    /// In the left list: a left-strip width. In the right list: a right-tokenize width.
    Strip(usize),
    /// Restage the token's active phrase.
    Switch(PhraseRef<TTag>),
    /// Reassign the parent node's phrase (node candidates only).
    SwitchParent(PhraseRef<TTag>),
}

/// A single feature operator of a [Feat] pipeline.
///
/// Operators are composable with `|` into a pipeline; the internal execution order is
/// fixed regardless of the written order: left-strips run before the token is
/// committed, right-tokenizes afterwards, switches stage at the point they are written,
/// and a single forward runs last.
pub enum FeatOp<TTag: TagImpl> {
    /// Strip an amount of content before the token into the currently staged phrase,
    /// before the token itself is committed.
    ///
    /// Widens the candidate's designated region on the left (increasing its priority);
    /// the stripped characters are sub-tokenized through the staged phrase and appended
    /// to the node that is active before the commit.
    LStrip(usize),
    /// Carve an amount of content off the token's tail and sub-tokenize it through the
    /// currently staged phrase, after the token has been committed.
    ///
    /// The width is deducted from the candidate's `to` before the content is
    /// materialized; for a node start the carved tokens land inside the new node.
    RTokenize(usize),
    /// Restage the token's active phrase.
    ///
    /// On a node start this changes the new node's phrase (future `ends`/`tokenize` use
    /// the switched phrase); on standalone and end tokens it reassigns the owning
    /// node's phrase. Later strips in the pipeline carve through the switched phrase.
    SwitchTo(PhraseRef<TTag>),
    /// Reassign the phrase of the *parent* node (node start candidates only).
    ///
    /// Unlike [SwitchTo](FeatOp::SwitchTo) this never affects the new node itself, and
    /// it does not influence the context in which strips are processed.
    SwitchPh(PhraseRef<TTag>),
    /// Query a phrase start directly after the token has been processed and commit the
    /// returned candidate as a fresh sub-item. At most one per pipeline; runs last.
    ForwardTo(PhraseRef<TTag>),
}

/// An error returned when a parse cannot make progress or a candidate configuration is
/// faulted.
#[derive(Debug)]
pub struct ParseError {
    pub kind: ErrorKind,
    /// Identity of the phrase of the node the parse was in.
    pub phrase: &'static str,
    pub row_no: usize,
    pub row: String,
    pub cursor: usize,
    pub unparsed: String,
    /// Designated content of the sub-stream for tokenization errors.
    pub designated: Option<String>,
    pub message: String,
}

/// The distinct failure conditions of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An iteration committed a progress-requiring token without advancing the stream.
    AdvanceStuckRow,
    /// A `tokenize` call returned without consuming from its sub-stream.
    AdvanceStuckTokenize,
    /// A zero-width mask token was encountered where it would loop forever.
    NullToken,
    /// A feature pipeline shrank a token's designated range below zero width or past
    /// the row.
    Feature,
    /// A configuration error surfaced while parsing.
    Misuse,
}

/// How much a phrase (or the root) reports about its candidate queries while parsing.
///
/// Assigned with a label through `set_log`; the label prefixes every report line so
/// parallel-configured phrases stay distinguishable. Each level includes everything the
/// levels before it report.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Log<T> {
    /// No reporting (the initial state when no label was assigned).
    None,
    /// Only a label carrier; nothing is reported per query.
    Default(T),
    /// Report candidates that were returned to the engine.
    Success(T),
    /// Additionally report queries that came back empty.
    Result(T),
    /// Everything above, kept for the most talkative configurations.
    Verbose(T),
}
