use crate::{End, IPhrase, Phrase, PhraseRef, Root, Start, StreamView, TagImpl, TokenizeStream};
use regex::Regex;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum BracketTag {
    Content,
    Comma,
    Open,
    Close,
    Root,
    EOF,
}

impl TagImpl for BracketTag {
    fn plain() -> Self {
        BracketTag::Content
    }
    fn root() -> Self {
        BracketTag::Root
    }
    fn eof() -> Self {
        BracketTag::EOF
    }
}

/// Phrase for parenthesized groups. Contains itself, so groups nest; inner content is
/// split on commas by a dedicated `tokenize`.
pub struct BracketPhrase {
    comma: Regex,
}

impl BracketPhrase {
    pub fn new() -> Self {
        Self {
            comma: Regex::new(",").unwrap(),
        }
    }
}

impl Default for BracketPhrase {
    fn default() -> Self {
        Self::new()
    }
}

impl IPhrase<BracketTag> for BracketPhrase {
    fn id(&self) -> &'static str {
        "bracket"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<BracketTag>> {
        stream
            .unparsed()
            .find('(')
            .map(|i| Start::node(BracketTag::Open, i, i + 1))
    }

    fn ends(&self, stream: &StreamView) -> Option<End<BracketTag>> {
        stream
            .unparsed()
            .find(')')
            .map(|i| End::new(BracketTag::Close, i, i + 1))
    }

    fn has_tokenize(&self) -> bool {
        true
    }

    fn tokenize(&self, stream: &mut TokenizeStream) -> BracketTag {
        if stream.unparsed().starts_with(',') {
            stream.eat_n(1);
            BracketTag::Comma
        } else {
            let _ = stream.eat_until(&self.comma, false);
            BracketTag::Content
        }
    }
}

/// Wire a root with a recursive bracket phrase.
pub fn bracket_root() -> (Root<BracketTag>, PhraseRef<BracketTag>) {
    let root = Root::new();
    let bracket = Phrase::new(BracketPhrase::new());
    bracket.add_subs(&[&bracket]);
    root.add_subs(&[&bracket]);
    (root, bracket)
}
