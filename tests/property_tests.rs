use proptest::prelude::*;
use sam_mini::{compile, MemBuffer};

mod support;
use support::run;

// Command-ish source: addresses, opcodes, delimiters, braces, escapes.
fn command_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9#$.,;+\\-/?{}=&\\\\' \t\n]{0,40}"
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("".to_string()),
        "[a-zA-Z0-9 .!?,;:\\-_]{0,60}",
        "[a-zA-Z0-9 \n]{0,200}",
        "[ \t]{0,10}\n[ \t]{0,10}\n[a-z]{0,10}",
    ]
}

proptest! {
    #[test]
    fn compile_never_panics(src in command_strategy()) {
        let _ = compile(&src);
    }

    #[test]
    fn identity_substitution_leaves_buffer_alone(text in text_strategy()) {
        let mut buf = MemBuffer::new(text.as_str());
        run(",s/[a-z]+/&/g", &mut buf).unwrap();
        prop_assert_eq!(buf.text(), text);
    }

    #[test]
    fn delete_all_empties_buffer(text in text_strategy()) {
        let mut buf = MemBuffer::new(text.as_str());
        run(",d", &mut buf).unwrap();
        prop_assert_eq!(buf.text(), "");
    }

    #[test]
    fn failed_run_is_a_rollback(text in text_strategy()) {
        // `~` never appears in the generated text, so the second command
        // always fails after the first staged a full delete.
        let mut buf = MemBuffer::new(text.as_str());
        run(",d\n/~/d", &mut buf).unwrap_err();
        prop_assert_eq!(buf.text(), text);
        prop_assert!(buf.changes().is_empty());
    }

    #[test]
    fn line_iteration_visits_every_line(text in "([a-z]{1,8}\n){1,10}") {
        // Deleting every line through the loop combinator empties the
        // buffer, whatever the line shapes are.
        let mut buf = MemBuffer::new(text.as_str());
        run(",x d", &mut buf).unwrap();
        prop_assert_eq!(buf.text(), "");
    }

    #[test]
    fn empty_selection_move_is_noop(text in "[a-z]{1,20}") {
        let mut buf = MemBuffer::new(text.as_str());
        run("#1,#1m$", &mut buf).unwrap();
        prop_assert_eq!(buf.text(), text);
    }
}
