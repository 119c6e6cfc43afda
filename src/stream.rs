use crate::Extras;
use regex::Regex;

/// The role a [TokenizeStream] is operating in, exposed so `tokenize` implementations
/// can behave differently per context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeContext {
    /// Content stripped off the front of a candidate (`<`).
    LStrip,
    /// Inner content of the current node, including row remainders (`i`).
    Inner,
    /// Content carved off the tail of a candidate (`>`).
    RTokenize,
    /// The gap between the cursor and an accepted node start candidate (`n`).
    NodeGap,
    /// The gap between the cursor and an accepted end candidate (`e`).
    EndGap,
}

impl TokenizeContext {
    /// One-character tag of the context.
    pub fn symbol(&self) -> char {
        match self {
            TokenizeContext::LStrip => '<',
            TokenizeContext::Inner => 'i',
            TokenizeContext::RTokenize => '>',
            TokenizeContext::NodeGap => 'n',
            TokenizeContext::EndGap => 'e',
        }
    }
}

/// A read-only view of the parse state passed to [starts](crate::IPhrase::starts),
/// [ends](crate::IPhrase::ends) and the node callbacks.
///
/// Candidate positions are byte offsets into [unparsed](StreamView::unparsed).
pub struct StreamView<'p> {
    pub(crate) row: &'p str,
    pub(crate) row_no: usize,
    pub(crate) viewpoint: usize,
    pub(crate) extras: &'p Extras,
}

impl<'p> StreamView<'p> {
    /// The current row, including its line terminator if any.
    pub fn row(&self) -> &'p str {
        self.row
    }

    /// Number of the current row (starting from 0).
    pub fn row_no(&self) -> usize {
        self.row_no
    }

    /// Byte position of the cursor within the current row.
    pub fn viewpoint(&self) -> usize {
        self.viewpoint
    }

    /// Remaining unparsed part of the current row.
    pub fn unparsed(&self) -> &'p str {
        &self.row[self.viewpoint..]
    }

    /// Already parsed part of the current row.
    pub fn parsed(&self) -> &'p str {
        &self.row[..self.viewpoint]
    }

    /// Extras of the currently active node.
    pub fn extras(&self) -> &'p Extras {
        self.extras
    }
}

/// A bounded sub-stream passed to [tokenize](crate::IPhrase::tokenize) for the dedicated
/// tokenization of a designated region of a row.
///
/// The engine repeatedly calls `tokenize` until the stream is exhausted; each call must
/// advance the stream through the `eat_*` methods, and the consumed characters become
/// the content of one token.
pub struct TokenizeStream<'d> {
    pub(crate) designated: &'d str,
    pub(crate) cursor: usize,
    pub(crate) context: TokenizeContext,
    pub(crate) i: usize,
}

impl<'d> TokenizeStream<'d> {
    pub(crate) fn new(designated: &'d str, context: TokenizeContext) -> Self {
        Self {
            designated,
            cursor: 0,
            context,
            i: 0,
        }
    }

    /// The whole content of the designated region.
    pub fn designated(&self) -> &'d str {
        self.designated
    }

    /// Unparsed part of the designated content.
    pub fn unparsed(&self) -> &'d str {
        &self.designated[self.cursor..]
    }

    /// Already tokenized part of the designated content.
    pub fn parsed(&self) -> &'d str {
        &self.designated[..self.cursor]
    }

    /// The context this stream operates in.
    pub fn context(&self) -> TokenizeContext {
        self.context
    }

    /// Counter of the tokenization calls performed on this stream so far.
    pub fn i(&self) -> usize {
        self.i
    }

    /// Advance the stream by `n` bytes of the unparsed content and return them.
    pub fn eat_n(&mut self, n: usize) -> &'d str {
        let end = (self.cursor + n).min(self.designated.len());
        let consumed = &self.designated[self.cursor..end];
        self.cursor = end;
        consumed
    }

    /// Advance the stream to the end and return the rest of the unparsed content.
    pub fn eat_remain(&mut self) -> &'d str {
        let consumed = &self.designated[self.cursor..];
        self.cursor = self.designated.len();
        consumed
    }

    /// Advance the stream to the beginning of the first `regex` match in the unparsed
    /// part and return the advanced content (exclusive of the matching content).
    ///
    /// Without a match the remainder is consumed and returned, unless `strict` is set,
    /// in which case [None] is returned and nothing is consumed.
    pub fn eat_until(&mut self, regex: &Regex, strict: bool) -> Option<&'d str> {
        match regex.find(self.unparsed()) {
            Some(m) => {
                let consumed = &self.designated[self.cursor..self.cursor + m.start()];
                self.cursor += m.start();
                Some(consumed)
            }
            None if strict => None,
            None => Some(self.eat_remain()),
        }
    }

    /// Advance the stream character by character as long as the predicate holds on the
    /// next character, then return the consumed sum.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'d str {
        let start = self.cursor;
        while let Some(c) = self.designated[self.cursor..].chars().next() {
            if !f(c) {
                break;
            }
            self.cursor += c.len_utf8();
        }
        &self.designated[start..self.cursor]
    }
}

#[cfg(test)]
mod tests {
    use super::{TokenizeContext, TokenizeStream};
    use regex::Regex;

    #[test]
    fn eats() {
        let mut stream = TokenizeStream::new("foo*bar!baz", TokenizeContext::Inner);
        assert_eq!(stream.eat_n(3), "foo");
        assert_eq!(stream.parsed(), "foo");

        let excl = Regex::new("!").unwrap();
        assert_eq!(stream.eat_until(&excl, false), Some("*bar"));
        assert_eq!(stream.unparsed(), "!baz");

        let never = Regex::new("§").unwrap();
        assert_eq!(stream.eat_until(&never, true), None);
        assert_eq!(stream.unparsed(), "!baz");

        assert_eq!(stream.eat_while(|c| !c.is_alphanumeric()), "!");
        assert_eq!(stream.eat_remain(), "baz");
        assert_eq!(stream.unparsed(), "");
    }

    #[test]
    fn eat_n_is_clamped() {
        let mut stream = TokenizeStream::new("ab", TokenizeContext::RTokenize);
        assert_eq!(stream.eat_n(10), "ab");
        assert_eq!(stream.eat_n(1), "");
    }
}
