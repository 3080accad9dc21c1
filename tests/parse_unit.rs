use shell_context::{shell_split, Environment, ErrorKind};

#[test]
fn split_black_box() {
    assert_eq!(shell_split("echo a b c").unwrap(), vec!["echo", "a", "b", "c"]);
    assert_eq!(shell_split("small\\ param2").unwrap(), vec!["small param2"]);
    assert_eq!(
        shell_split(r#""another long \"weird\" parameter""#).unwrap(),
        vec![r#"another long "weird" parameter"#]
    );
}

#[test]
fn malformed_line_has_no_partial_result() {
    let err = shell_split("echo \"unterminated").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert!(err
        .display_with_input("echo \"unterminated")
        .contains("near: 'echo \"unterminated'"));
}

#[test]
fn expansion_happens_before_splitting() {
    let env = Environment::from_iter([("ARGS", "-l -a"), ("NAME", "\"two words\"")]);
    let tokens = shell_split(&env.expand("ls $ARGS ${NAME} $MISSING.")).unwrap();
    assert_eq!(tokens, vec!["ls", "-l", "-a", "two words", "."]);
}
