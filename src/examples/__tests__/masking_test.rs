use crate::examples::strings::{string_root, TextTag};
use crate::TokenKind;

#[test]
fn escaped_quote_stays_inert() {
    let (root, _) = string_root();
    let tree = root.parse_string(r#""a\"b""#).unwrap();
    assert_eq!(tree.content(), r#""a\"b""#);

    let node = tree.root().get_item(0).unwrap();
    assert_eq!(node.tag(), TextTag::StringOpen);
    assert_eq!(node.end().unwrap().tag(), TextTag::StringClose);
    assert_eq!(node.end().unwrap().content(), "\"");

    // the masked escape is plain inner content, no extra branch, no lost characters
    let inner: Vec<_> = node.items().collect();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner[0].content(), r#"a\"b"#);
    assert_eq!(inner[0].tag(), TextTag::StringText);
    assert_eq!(inner[0].kind(), TokenKind::Plain);
}

#[test]
fn quote_kind_is_recalled_from_extras() {
    let (root, _) = string_root();
    let tree = root.parse_string("x'a\"b'y").unwrap();
    assert_eq!(tree.content(), "x'a\"b'y");

    let node = tree.root().get_item(1).unwrap();
    assert_eq!(node.content(), "'");
    // the double quote inside a single quoted string does not terminate it
    assert_eq!(node.end().unwrap().content(), "'");
    assert_eq!(node.items().map(|t| t.content()).collect::<Vec<_>>(), ["a\"b"]);
}

#[test]
fn raw_span_masks_across_rows() {
    let (root, _) = string_root();
    let input = "\"ab#>x\" y\nz<#cd\"";
    let tree = root.parse_string(input).unwrap();
    assert_eq!(tree.content(), input);

    // one single string node spans both rows
    let items: Vec<_> = tree.root().items().collect();
    assert_eq!(items.len(), 1);
    let node = items[0];
    assert_eq!(node.tag(), TextTag::StringOpen);
    assert_eq!(node.row_no(), 0);

    // the quote inside the raw span did not close the string
    let end = node.end().unwrap();
    assert_eq!(end.tag(), TextTag::StringClose);
    assert_eq!(end.row_no(), 1);

    let inner: Vec<&str> = node.items().map(|t| t.content()).collect();
    assert_eq!(inner, ["ab#>x\" y\n", "z<#cd"]);
    for token in node.items() {
        assert_eq!(token.tag(), TextTag::StringText);
    }
}
