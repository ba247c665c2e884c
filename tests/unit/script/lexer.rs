use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src, 0).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_slices_and_assignment() {
    assert_eq!(
        kinds("img[10:, ::2] = 255;"),
        vec![
            TokenKind::Ident("img".to_owned()),
            TokenKind::LBracket,
            TokenKind::Number(10.0),
            TokenKind::Colon,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Colon,
            TokenKind::Number(2.0),
            TokenKind::RBracket,
            TokenKind::Assign,
            TokenKind::Number(255.0),
            TokenKind::Semi,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn double_equals_is_not_two_assignments() {
    assert_eq!(
        kinds("a == b"),
        vec![
            TokenKind::Ident("a".to_owned()),
            TokenKind::EqEq,
            TokenKind::Ident("b".to_owned()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn numbers_with_fraction() {
    assert_eq!(
        kinds("0.5 .25 7"),
        vec![
            TokenKind::Number(0.5),
            TokenKind::Number(0.25),
            TokenKind::Number(7.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn dot_after_integer_is_attribute_access() {
    assert_eq!(
        kinds("x[1].width"),
        vec![
            TokenKind::Ident("x".to_owned()),
            TokenKind::LBracket,
            TokenKind::Number(1.0),
            TokenKind::RBracket,
            TokenKind::Dot,
            TokenKind::Ident("width".to_owned()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn spans_point_into_source() {
    let toks = lex("  gray(img)", 0).unwrap();
    assert_eq!(toks[0].span, Span { start: 2, end: 6 });
    assert_eq!(toks.last().unwrap().span.start, 11);
}

#[test]
fn scanning_from_an_offset_keeps_absolute_spans() {
    let toks = lex("@@hflip(img)", 2).unwrap();
    assert_eq!(toks[0].kind, TokenKind::Ident("hflip".to_owned()));
    assert_eq!(toks[0].span, Span { start: 2, end: 7 });
    let err = lex("$$x = #", 2).unwrap_err();
    assert_eq!(err.offset(), 6);
}

#[test]
fn rejects_unknown_characters_with_offset() {
    let err = lex("img # 2", 0).unwrap_err();
    assert_eq!(err.offset(), 4);
    assert!(err.message().contains('#'));
}

#[test]
fn rejects_letters_glued_to_numbers() {
    let err = lex("3px", 0).unwrap_err();
    assert_eq!(err.offset(), 1);
    assert!(lex("1e3", 0).is_err());
}

#[test]
fn non_ascii_input_is_rejected_not_split() {
    let err = lex("img\u{a0}+ 1", 0).unwrap_err();
    assert_eq!(err.offset(), 3);
    assert!(err.message().contains('\u{a0}'));
}
