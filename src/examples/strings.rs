use crate::{End, IPhrase, Phrase, PhraseRef, Root, Start, StreamView, TagImpl};
use regex::Regex;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum TextTag {
    Text,
    StringOpen,
    StringText,
    StringClose,
    Root,
    EOF,
}

impl TagImpl for TextTag {
    fn plain() -> Self {
        TextTag::Text
    }
    fn root() -> Self {
        TextTag::Root
    }
    fn eof() -> Self {
        TextTag::EOF
    }
}

/// Masks backslash escapes inside a string, so an escaped quote cannot terminate it.
pub struct EscapePhrase {
    escape: Regex,
}

impl EscapePhrase {
    pub fn new() -> Self {
        Self {
            escape: Regex::new(r"\\.").unwrap(),
        }
    }
}

impl IPhrase<TextTag> for EscapePhrase {
    fn id(&self) -> &'static str {
        "string-escape"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<TextTag>> {
        self.escape
            .find(stream.unparsed())
            .map(|m| Start::mask(m.start(), m.end()))
    }
}

/// Masks a raw span `#>` ... `<#` inside a string; the span may cross rows and its
/// content cannot terminate the string.
pub struct RawSpanPhrase {
    open: Regex,
    close: Regex,
}

impl RawSpanPhrase {
    pub fn new() -> Self {
        Self {
            open: Regex::new("#>").unwrap(),
            close: Regex::new("<#").unwrap(),
        }
    }
}

impl IPhrase<TextTag> for RawSpanPhrase {
    fn id(&self) -> &'static str {
        "string-raw-span"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<TextTag>> {
        self.open
            .find(stream.unparsed())
            .map(|m| Start::mask_node(m.start(), m.end()))
    }

    fn ends(&self, stream: &StreamView) -> Option<End<TextTag>> {
        self.close
            .find(stream.unparsed())
            .map(|m| End::new(TextTag::StringText, m.start(), m.end()))
    }
}

/// Quoted string phrase. The opening quote kind is stored in the node extras and
/// recalled by `ends`, so `'...'` and `"..."` close correctly.
pub struct StringPhrase {
    quotes: Regex,
}

impl StringPhrase {
    pub fn new() -> Self {
        Self {
            quotes: Regex::new("['\"]").unwrap(),
        }
    }
}

impl IPhrase<TextTag> for StringPhrase {
    fn id(&self) -> &'static str {
        "string"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<TextTag>> {
        self.quotes.find(stream.unparsed()).map(|m| {
            Start::node(TextTag::StringOpen, m.start(), m.end())
                .extra("quotes", m.as_str().to_string())
        })
    }

    fn ends(&self, stream: &StreamView) -> Option<End<TextTag>> {
        let quotes = stream.extras().get_str("quotes")?;
        stream
            .unparsed()
            .find(quotes)
            .map(|i| End::new(TextTag::StringClose, i, i + quotes.len()))
    }

    fn default_tag(&self) -> TextTag {
        TextTag::StringText
    }
}

/// Wire a root with the string phrase and its masking sub-phrases.
pub fn string_root() -> (Root<TextTag>, PhraseRef<TextTag>) {
    let root = Root::new();
    let string = Phrase::new(StringPhrase::new());
    let escape = Phrase::new(EscapePhrase::new());
    let raw_span = Phrase::new(RawSpanPhrase::new());
    string.add_subs(&[&escape, &raw_span]);
    root.add_subs(&[&string]);
    (root, string)
}
