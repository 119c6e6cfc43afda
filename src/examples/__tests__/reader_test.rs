use crate::examples::brackets::bracket_root;
use crate::TokenKind;

#[test]
fn branch_covers_the_whole_result() {
    let (root, _) = bracket_root();
    let tree = root.parse_string("a(b(c)d)e").unwrap();

    let all: Vec<_> = tree.root().branch().collect();
    let contents: Vec<&str> = all.iter().map(|t| t.content()).collect();
    assert_eq!(
        contents,
        ["", "a", "(", "b", "(", "c", ")", "d", ")", "e", ""]
    );

    // branch = anchor + inner + end
    let inner: Vec<_> = tree.root().inner().collect();
    assert_eq!(all.len(), inner.len() + 2);
    assert_eq!(&all[1..all.len() - 1], &inner[..]);

    // reversal yields the same tokens backwards
    let mut forward = all.clone();
    forward.reverse();
    let reversed: Vec<_> = tree.root().branch().reversed().collect();
    assert_eq!(reversed, forward);
}

#[test]
fn beyond_readers_split_the_document_at_the_anchor() {
    let (root, _) = bracket_root();
    let input = "a(b(c)d)e";
    let tree = root.parse_string(input).unwrap();

    let anchor = tree.root().find(|t| t.content() == "c").unwrap();
    assert_eq!(anchor.data_start(), 4);
    assert_eq!(anchor.therebefore().content(), &input[..4]);
    assert_eq!(anchor.thereafter().content(), &input[5..]);
    assert_eq!(anchor.therebefore().reversed().content(), "(b(a");

    // single steps agree with the linear order
    assert_eq!(tree.root().next_token().unwrap().content(), "a");
    assert!(tree.root().previous_token().is_none());
    let eof = tree.root().end().unwrap();
    assert_eq!(eof.previous_token().unwrap().content(), "e");
    assert!(eof.next_token().is_none());

    // iteration beyond the edges is simply exhausted
    assert_eq!(eof.thereafter().count(), 0);
    assert_eq!(tree.root().therebefore().count(), 0);
}

#[test]
fn document_order_is_monotone() {
    let (root, _) = bracket_root();
    let tree = root.parse_string("a(b(c)d)e\n(f,(g))h\n").unwrap();

    let mut previous = (0, 0);
    for token in tree.root().branch() {
        let position = (token.row_no(), token.column_start());
        assert!(
            position >= previous,
            "{:?} stepped back from {:?}",
            position,
            previous
        );
        previous = position;
    }
}

#[test]
fn node_path_walks_root_to_anchor() {
    let (root, _) = bracket_root();
    let tree = root.parse_string("a(b(c)d)e").unwrap();

    let anchor = tree.root().find(|t| t.content() == "c").unwrap();
    let path: Vec<_> = anchor.node_path().collect();
    assert_eq!(path.len(), 3);
    assert_eq!(path[0].kind(), TokenKind::Root);
    assert_eq!(path[1].content(), "(");
    assert_eq!(path[2], anchor.node());

    let reversed: Vec<_> = anchor.node_path().reversed().collect();
    assert_eq!(reversed[0], anchor.node());
    assert_eq!(reversed[2].kind(), TokenKind::Root);
}

#[test]
fn inner_reader_flattens_sub_branches() {
    let (root, _) = bracket_root();
    let tree = root.parse_string("a(b(c)d)e").unwrap();

    let outer = tree.root().get_item(1).unwrap();
    let inner: Vec<&str> = outer.inner().map(|t| t.content()).collect();
    assert_eq!(inner, ["b", "(", "c", ")", "d"]);
    assert_eq!(outer.len_inner(), 5);
    assert_eq!(outer.len_branch(), 7);

    let branch: Vec<&str> = outer.branch().map(|t| t.content()).collect();
    assert_eq!(branch, ["(", "b", "(", "c", ")", "d", ")"]);
    let reversed: Vec<&str> = outer.branch().reversed().map(|t| t.content()).collect();
    assert_eq!(reversed, [")", "d", ")", "c", "(", "b", "("]);
}
