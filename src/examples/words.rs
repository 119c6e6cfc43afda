use crate::{End, IPhrase, Phrase, PhraseRef, Root, Start, StreamView, TagImpl, TokenizeStream};
use regex::Regex;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum CodeTag {
    Filler,
    Word,
    WordEnd,
    Keyword,
    Number,
    Identifier,
    Root,
    EOF,
}

impl TagImpl for CodeTag {
    fn plain() -> Self {
        CodeTag::Filler
    }
    fn root() -> Self {
        CodeTag::Root
    }
    fn eof() -> Self {
        CodeTag::EOF
    }
}

const KEYWORDS: [&str; 7] = ["if", "else", "for", "while", "not", "is", "in"];

/// Phrase for word-like runs. The whole match is forwarded into the node through a
/// right-tokenize, where `tokenize` classifies it; the node itself closes instantly.
pub struct WordPhrase {
    word: Regex,
    number: Regex,
}

impl WordPhrase {
    pub fn new() -> Self {
        Self {
            word: Regex::new(r"\w+").unwrap(),
            number: Regex::new(r"^\d+$").unwrap(),
        }
    }
}

impl IPhrase<CodeTag> for WordPhrase {
    fn id(&self) -> &'static str {
        "word"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<CodeTag>> {
        self.word.find(stream.unparsed()).map(|m| {
            Start::node(CodeTag::Word, m.start(), m.end()).rtokenize(m.end() - m.start())
        })
    }

    fn ends(&self, _: &StreamView) -> Option<End<CodeTag>> {
        // the phrase ends immediately without content after the start process
        Some(End::instant(CodeTag::WordEnd))
    }

    fn has_tokenize(&self) -> bool {
        true
    }

    fn tokenize(&self, stream: &mut TokenizeStream) -> CodeTag {
        let token = stream.eat_remain();
        if KEYWORDS.contains(&token) {
            CodeTag::Keyword
        } else if self.number.is_match(token) {
            CodeTag::Number
        } else {
            CodeTag::Identifier
        }
    }
}

/// Wire a root with the word phrase.
pub fn word_root() -> (Root<CodeTag>, PhraseRef<CodeTag>) {
    let root = Root::new();
    let word = Phrase::new(WordPhrase::new());
    root.add_subs(&[&word]);
    (root, word)
}
