use crate::{ErrorKind, IPhrase, Phrase, PhraseRef, Root, Start, StreamView, TokenizeStream};
use once_cell::unsync::OnceCell;
use std::rc::Rc;

struct StuckPhrase;

impl IPhrase<i8> for StuckPhrase {
    fn id(&self) -> &'static str {
        "stuck"
    }

    fn starts(&self, _: &StreamView) -> Option<Start<i8>> {
        // a zero-width, non-instant candidate nothing ever carries past
        Some(Start::token(1, 0, 0))
    }
}

#[test]
fn zero_width_token_without_progress_is_fatal() {
    let root = Root::<i8>::new();
    let stuck = Phrase::new(StuckPhrase);
    root.add_subs(&[&stuck]);

    let error = root.parse_string("abc").unwrap_err();
    assert_eq!(error.kind, ErrorKind::AdvanceStuckRow);
    assert_eq!(error.row_no, 0);
    assert_eq!(error.row, "abc");
    assert_eq!(error.unparsed, "abc");
}

struct LazyTokenizePhrase;

impl IPhrase<i8> for LazyTokenizePhrase {
    fn id(&self) -> &'static str {
        "lazy"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        stream.unparsed().find('[').map(|i| Start::node(1, i, i + 1))
    }

    fn has_tokenize(&self) -> bool {
        true
    }

    fn tokenize(&self, _: &mut TokenizeStream) -> i8 {
        9 // returns without consuming
    }
}

#[test]
fn tokenize_without_consuming_is_fatal() {
    let root = Root::<i8>::new();
    let lazy = Phrase::new(LazyTokenizePhrase);
    root.add_subs(&[&lazy]);

    let error = root.parse_string("[x").unwrap_err();
    assert_eq!(error.kind, ErrorKind::AdvanceStuckTokenize);
    assert_eq!(error.designated.as_deref(), Some("x"));
    assert_eq!(error.phrase, "lazy");
}

struct NullMaskPhrase;

impl IPhrase<i8> for NullMaskPhrase {
    fn id(&self) -> &'static str {
        "null-mask"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        if stream.unparsed().starts_with('Z') {
            Some(Start::mask(0, 0))
        } else {
            None
        }
    }
}

#[test]
fn zero_width_mask_is_fatal() {
    let root = Root::<i8>::new();
    let mask = Phrase::new(NullMaskPhrase);
    root.add_subs(&[&mask]);

    let error = root.parse_string("Zq").unwrap_err();
    assert_eq!(error.kind, ErrorKind::NullToken);
}

struct OverdrawnPhrase;

impl IPhrase<i8> for OverdrawnPhrase {
    fn id(&self) -> &'static str {
        "overdrawn"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        if stream.viewpoint() == 0 {
            // right-tokenize wider than the whole designated range
            Some(Start::token(1, 0, 1).rtokenize(5))
        } else {
            None
        }
    }
}

#[test]
fn inverted_designated_range_is_fatal() {
    let root = Root::<i8>::new();
    let overdrawn = Phrase::new(OverdrawnPhrase);
    root.add_subs(&[&overdrawn]);

    let error = root.parse_string("ab").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Feature);
}

struct SwitchPhOnTokenPhrase {
    other: PhraseRef<i8>,
}

impl IPhrase<i8> for SwitchPhOnTokenPhrase {
    fn id(&self) -> &'static str {
        "bad-switch"
    }

    fn starts(&self, _: &StreamView) -> Option<Start<i8>> {
        Some(Start::token(1, 0, 1).switch_ph(&self.other))
    }
}

#[test]
fn switch_ph_on_a_plain_token_is_misuse() {
    let root = Root::<i8>::new();
    let stuck = Phrase::new(StuckPhrase);
    let bad = Phrase::new(SwitchPhOnTokenPhrase {
        other: stuck.clone(),
    });
    root.add_subs(&[&bad]);

    let error = root.parse_string("ab").unwrap_err();
    assert_eq!(error.kind, ErrorKind::Misuse);
}

struct SelfForwardPhrase {
    this: Rc<OnceCell<PhraseRef<i8>>>,
}

impl IPhrase<i8> for SelfForwardPhrase {
    fn id(&self) -> &'static str {
        "self-forward"
    }

    fn starts(&self, stream: &StreamView) -> Option<Start<i8>> {
        let this = self.this.get()?;
        stream
            .unparsed()
            .find('F')
            .map(|i| Start::token(1, i, i + 1).forward_to(this))
    }
}

#[test]
fn runaway_forward_chain_is_misuse() {
    let root = Root::<i8>::new();
    let cell: Rc<OnceCell<PhraseRef<i8>>> = Rc::new(OnceCell::new());
    let forward = Phrase::new(SelfForwardPhrase { this: cell.clone() });
    assert!(cell.set(forward.clone()).is_ok());
    root.add_subs(&[&forward]);

    // every committed token forwards into the next, deeper than the engine allows
    let error = root.parse_string(&"F".repeat(200)).unwrap_err();
    assert_eq!(error.kind, ErrorKind::Misuse);
    assert!(error.message.contains("forward chain"));
}

#[test]
#[should_panic(expected = "Root")]
fn root_as_sub_phrase_panics() {
    let root = Root::<i8>::new();
    let stuck = Phrase::new(StuckPhrase);
    stuck.add_subs(&[root.phrase()]);
}

#[test]
fn error_display_names_the_position() {
    let root = Root::<i8>::new();
    let stuck = Phrase::new(StuckPhrase);
    root.add_subs(&[&stuck]);

    let error = root.parse_string("abc").unwrap_err();
    let rendered = format!("{}", error);
    assert!(rendered.contains("advance-stuck-row"));
    assert!(rendered.contains("\"abc\""));
}
