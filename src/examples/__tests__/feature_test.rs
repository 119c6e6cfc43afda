use crate::{End, IPhrase, Phrase, PhraseRef, Root, Start, StreamView, TokenKind};

struct ChainPhrase {
    main: PhraseRef<i8>,
}

impl IPhrase<i8> for ChainPhrase {
    fn id(&self) -> &'static str {
        "chain"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        if stream.row_no() == 0 && stream.viewpoint() == 0 {
            Some(
                Start::token(7, 5, 11)
                    .lstrip(2)
                    .switch_to(&self.main)
                    .lstrip(1)
                    .rtokenize(3),
            )
        } else {
            None
        }
    }
}

#[test]
fn strip_switch_and_rtokenize_keep_content() {
    let root = Root::<i8>::new();
    let chain = Phrase::new(ChainPhrase {
        main: root.phrase().clone(),
    });
    root.add_subs(&[&chain]);

    let tree = root.parse_string("0123456789AB").unwrap();
    assert_eq!(tree.content(), "0123456789AB");

    let contents: Vec<&str> = tree.root().items().map(|t| t.content()).collect();
    // gap, two left strips, the shrunken token itself, the right-tokenized tail, rest
    assert_eq!(contents, ["01234", "56", "7", "", "89A", "B"]);
    let tags: Vec<i8> = tree.root().items().map(|t| t.tag()).collect();
    assert_eq!(tags, [0, 0, 0, 7, 0, 0]);
}

struct OuterPhrase;

impl IPhrase<i8> for OuterPhrase {
    fn id(&self) -> &'static str {
        "outer"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        stream.unparsed().find('[').map(|i| Start::node(1, i, i + 1))
    }

    fn ends(&self, stream: &StreamView) -> Option<End<i8>> {
        stream.unparsed().find(']').map(|i| End::new(2, i, i + 1))
    }
}

struct AltPhrase;

impl IPhrase<i8> for AltPhrase {
    fn id(&self) -> &'static str {
        "alt"
    }

    fn starts(&self, _: &StreamView) -> Option<Start<i8>> {
        None
    }

    fn ends(&self, stream: &StreamView) -> Option<End<i8>> {
        stream.unparsed().find('!').map(|i| End::new(3, i, i + 1))
    }
}

struct InnerPhrase {
    alt: PhraseRef<i8>,
}

impl IPhrase<i8> for InnerPhrase {
    fn id(&self) -> &'static str {
        "inner"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        stream
            .unparsed()
            .find('*')
            .map(|i| Start::node(4, i, i + 1).switch_ph(&self.alt))
    }

    fn ends(&self, _: &StreamView) -> Option<End<i8>> {
        Some(End::instant(5))
    }
}

#[test]
fn switch_ph_retargets_the_parent_phrase() {
    let root = Root::<i8>::new();
    let alt = Phrase::new(AltPhrase);
    let inner = Phrase::new(InnerPhrase { alt: alt.clone() });
    let outer = Phrase::new(OuterPhrase);
    outer.add_subs(&[&inner]);
    root.add_subs(&[&outer]);

    let tree = root.parse_string("[a*b!c]").unwrap();
    assert_eq!(tree.content(), "[a*b!c]");

    let node = tree.root().get_item(0).unwrap();
    assert_eq!(node.content(), "[");
    // the inner node declared its parent to be an alt branch, which then closed at '!'
    assert_eq!(node.phrase().unwrap().id(), "alt");
    assert_eq!(node.end().unwrap().content(), "!");
    assert_eq!(node.end().unwrap().tag(), 3);
    // the original terminator is left for the root
    let trailing = tree.root().items().last().unwrap();
    assert_eq!(trailing.content(), "c]");
}

struct BracePhrase {
    forward: PhraseRef<i8>,
}

impl IPhrase<i8> for BracePhrase {
    fn id(&self) -> &'static str {
        "brace"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        stream
            .unparsed()
            .find('<')
            .map(|i| Start::node(1, i, i + 1))
    }

    fn ends(&self, stream: &StreamView) -> Option<End<i8>> {
        stream
            .unparsed()
            .find('>')
            .map(|i| End::new(2, i, i + 1).forward_to(&self.forward))
    }
}

struct TargetPhrase;

impl IPhrase<i8> for TargetPhrase {
    fn id(&self) -> &'static str {
        "target"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        stream.unparsed().find('B').map(|i| Start::node(3, i, i + 1))
    }

    fn ends(&self, _: &StreamView) -> Option<End<i8>> {
        Some(End::instant(4))
    }
}

#[test]
fn forward_after_end_commits_directly() {
    let root = Root::<i8>::new();
    let target = Phrase::new(TargetPhrase);
    let brace = Phrase::new(BracePhrase {
        forward: target.clone(),
    });
    root.add_subs(&[&brace]);

    let tree = root.parse_string("<x>Byz").unwrap();
    assert_eq!(tree.content(), "<x>Byz");

    let items: Vec<_> = tree.root().items().collect();
    assert_eq!(items.len(), 3);
    let brace_node = items[0];
    let forwarded = items[1];
    assert_eq!(forwarded.tag(), 3);
    assert_eq!(forwarded.content(), "B");
    // the forwarded node follows the end without arbitration or a gap
    assert_eq!(
        brace_node.end().unwrap().column_end(),
        forwarded.column_start()
    );
    assert_eq!(items[2].content(), "yz");
}

struct WrapPhrase {
    forward: PhraseRef<i8>,
}

impl IPhrase<i8> for WrapPhrase {
    fn id(&self) -> &'static str {
        "wrap"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        stream
            .unparsed()
            .find('{')
            .map(|i| Start::node(1, i, i + 1).forward_to(&self.forward))
    }
}

#[test]
fn forward_on_node_start_nests_inside() {
    let root = Root::<i8>::new();
    let target = Phrase::new(TargetPhrase);
    let wrap = Phrase::new(WrapPhrase {
        forward: target.clone(),
    });
    root.add_subs(&[&wrap]);

    let tree = root.parse_string("{Bq").unwrap();
    assert_eq!(tree.content(), "{Bq");

    let wrap_node = tree.root().get_item(0).unwrap();
    let inner: Vec<_> = wrap_node.items().collect();
    assert_eq!(inner.len(), 2);
    assert_eq!(inner[0].tag(), 3);
    assert_eq!(inner[0].content(), "B");
    assert_eq!(inner[1].content(), "q");
    assert_eq!(wrap_node.end().unwrap().kind(), TokenKind::Eof);
}

struct HashPhrase;

impl IPhrase<i8> for HashPhrase {
    fn id(&self) -> &'static str {
        "hash"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        stream.unparsed().find('#').map(|i| Start::node(1, i, i + 1))
    }

    fn ends(&self, stream: &StreamView) -> Option<End<i8>> {
        stream
            .unparsed()
            .find('$')
            .map(|i| End::new(2, i, i + 3).rtokenize(2))
    }
}

#[test]
fn rtokenize_on_an_end_lands_in_the_parent() {
    let root = Root::<i8>::new();
    let hash = Phrase::new(HashPhrase);
    root.add_subs(&[&hash]);

    let tree = root.parse_string("#ab$XYq").unwrap();
    assert_eq!(tree.content(), "#ab$XYq");

    let items: Vec<_> = tree.root().items().collect();
    assert_eq!(items.len(), 3);
    let node = items[0];
    assert_eq!(node.end().unwrap().content(), "$");
    let inner: Vec<&str> = node.items().map(|t| t.content()).collect();
    assert_eq!(inner, ["ab"]);
    // the carved tail belongs to the parent, directly behind the end
    assert_eq!(items[1].content(), "XY");
    assert_eq!(items[2].content(), "q");
}
