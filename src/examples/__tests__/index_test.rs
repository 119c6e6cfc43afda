use crate::examples::brackets::{bracket_root, BracketPhrase, BracketTag};
use crate::{ExtensiveTokenIndex, ITokenIndex, NoneTokenIndex, Phrase, Root};

#[test]
fn rows_are_recorded_and_located() {
    let (root, _) = bracket_root();
    let tree = root.parse_string("ab(cd\nef)gh\n").unwrap();
    assert_eq!(tree.content(), "ab(cd\nef)gh\n");

    assert_eq!(tree.index().len_rows(), 2);
    assert_eq!(
        tree.index().record(0).unwrap().first_token(),
        tree.root().key()
    );

    assert_eq!(tree.token_at_coord(0, 0).unwrap().content(), "ab");
    assert_eq!(tree.token_at_coord(0, 2).unwrap().content(), "(");
    assert_eq!(tree.token_at_coord(0, 4).unwrap().content(), "cd\n");
    assert_eq!(tree.token_at_coord(1, 2).unwrap().content(), ")");
    assert!(tree.token_at_coord(1, 40).is_none());

    assert_eq!(tree.index().len_row(tree.arena(), 0), 6);
    assert_eq!(tree.index().data_start_of_row(tree.arena(), 1), 6);
    assert_eq!(tree.token_at_cursor(7).unwrap().content(), "ef");
    assert_eq!(tree.token_at_cursor(11).unwrap().content(), "gh\n");
    assert!(tree.token_at_cursor(40).is_none());

    let close = tree.root().find(|t| t.content() == ")").unwrap();
    assert_eq!(close.data_start(), 8);
    assert_eq!(close.data_end(), 9);
}

#[test]
fn replace_content_shifts_the_row_and_invalidates_offsets() {
    let (root, _) = bracket_root();
    let mut tree = root.parse_string("ab(cd\nef)gh\n").unwrap();

    let ef = tree.root().find(|t| t.content() == "ef").unwrap().key();
    let close = tree.root().find(|t| t.content() == ")").unwrap().key();
    assert_eq!(tree.get(close).column_start(), 2);
    assert_eq!(tree.get(close).data_start(), 8);

    tree.replace_content(ef, "EFFF", true);

    assert_eq!(tree.get(ef).content(), "EFFF");
    assert_eq!(tree.get(ef).column_end(), 4);
    // following tokens of the same row shifted by the length difference
    assert_eq!(tree.get(close).column_start(), 4);
    assert_eq!(tree.get(close).data_start(), 10);
    // earlier rows are untouched
    assert_eq!(tree.token_at_coord(0, 2).unwrap().content(), "(");
    assert_eq!(tree.content(), "ab(cd\nEFFF)gh\n");
    assert_eq!(tree.token_at_cursor(8).unwrap().content(), "EFFF");
}

#[test]
fn minimal_index_still_resolves_data_offsets() {
    let root: Root<BracketTag, NoneTokenIndex> = Root::new();
    let bracket = Phrase::new(BracketPhrase::new());
    bracket.add_subs(&[&bracket]);
    root.add_subs(&[&bracket]);
    let tree = root.parse_string("ab(cd)e").unwrap();
    assert_eq!(tree.content(), "ab(cd)e");
    assert!(tree.token_at_coord(0, 0).is_none());

    // the walking fallback still answers data offsets
    let cd = tree.root().find(|t| t.content() == "cd").unwrap();
    assert_eq!(cd.data_start(), 3);
    assert_eq!(cd.data_end(), 5);
}

#[test]
fn stale_entry_resolves_the_first_token_of_the_row() {
    let (root, _) = bracket_root();
    let tree = root.parse_string("a(b(c)d)e").unwrap();

    let anchor = tree.root().find(|t| t.content() == "c").unwrap();
    let nested = anchor.node();
    assert_ne!(nested.column_start(), 0);

    let mut index = ExtensiveTokenIndex::default();
    index.at_stale(tree.arena(), nested.key(), 0);
    ITokenIndex::<BracketTag>::build(&mut index, tree.arena());
    assert_eq!(
        index.record(0).unwrap().first_token(),
        tree.root().key()
    );
}
