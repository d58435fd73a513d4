use sam_mini::{Delta, File, MemBuffer};

mod support;
use support::{run, run_print, MANUAL};

#[test]
fn append_after_regex_match() {
    let mut buf = MemBuffer::new("Code Emacs Vim Sam ed");
    run("/Emacs/a/ is not so great/", &mut buf).unwrap();
    assert_eq!(buf.text(), "Code Emacs is not so great Vim Sam ed");
    let expected = Delta::new().retain(10).insert(" is not so great");
    assert_eq!(buf.changes(), &expected);
}

#[test]
fn append_into_non_utf8_contents() {
    // A NUL byte in the middle stands in for a rich-text embed; byte
    // addressing must carry straight through it.
    let mut buf = MemBuffer::new(&b"Code Em\x00acs Emacs Vim Sam ed"[..]);
    run("/Emacs/a/ is not so great/", &mut buf).unwrap();
    assert_eq!(
        buf.bytes(),
        &b"Code Em\x00acs Emacs is not so great Vim Sam ed"[..]
    );
    let expected = Delta::new().retain(17).insert(" is not so great");
    assert_eq!(buf.changes(), &expected);
}

#[test]
fn x_loop_delete() {
    let mut buf = MemBuffer::new("Code Emacs Vim Sam ed");
    run(",x/m /d", &mut buf).unwrap();
    assert_eq!(buf.text(), "Code Emacs ViSaed");
    let expected = Delta::new().retain(13).delete(2).retain(2).delete(2);
    assert_eq!(buf.changes(), &expected);
}

#[test]
fn x_loop_relative_line_delete() {
    let mut buf = MemBuffer::new("1 45 1\n2 48 21\n3 45 1\n4 48 43\n5 45 1\n6 48 20\n");
    run(",x/^(5|6)/+-d", &mut buf).unwrap();
    assert_eq!(buf.text(), "1 45 1\n2 48 21\n3 45 1\n4 48 43\n");
}

#[test]
fn append_block_then_print() {
    let mut buf = MemBuffer::new("");
    run(&format!("a\n{MANUAL}."), &mut buf).unwrap();
    assert_eq!(buf.text(), MANUAL);
    let printed = run_print("p", &mut buf).unwrap();
    assert_eq!(buf.text(), MANUAL);
    assert_eq!(printed, MANUAL);
}

#[test]
fn change_line_then_print_dot() {
    let mut buf = MemBuffer::new(MANUAL);
    run("2c\nchanged\n.", &mut buf).unwrap();
    let expected = "\
This manual is organized in a rather haphazard manner. The first
changed
general introduction to the commands in Emacs and to try to show
the method in the madness that is the Emacs command structure.
";
    assert_eq!(buf.text(), expected);
    // Dot covers the replacement, so a bare `p` prints just that.
    let printed = run_print("p", &mut buf).unwrap();
    assert_eq!(printed, "changed\n");
    assert_eq!(buf.text(), expected);
}

#[test]
fn guard_runs_child_on_match() {
    let mut buf = MemBuffer::new(MANUAL);
    let printed = run_print("#1,g/manual/p", &mut buf).unwrap();
    assert_eq!(buf.text(), MANUAL);
    assert_eq!(printed, &MANUAL[1..]);
}

#[test]
fn inverse_guard_skips_child_on_match() {
    let mut buf = MemBuffer::new(MANUAL);
    let printed = run_print("#2,v/manual/p", &mut buf).unwrap();
    assert_eq!(buf.text(), MANUAL);
    assert_eq!(printed, "");
}

#[test]
fn insert_at_end_of_buffer() {
    let mut buf = MemBuffer::new(MANUAL);
    run("$i/thisisend/", &mut buf).unwrap();
    assert_eq!(buf.text(), format!("{MANUAL}thisisend"));
}

#[test]
fn move_to_destination_end() {
    let mut buf = MemBuffer::new(MANUAL);
    run("/manual/m/haphazard/", &mut buf).unwrap();
    let expected = "\
This  is organized in a rather haphazardmanual manner. The first
several sections were written hastily in an attempt to provide a
general introduction to the commands in Emacs and to try to show
the method in the madness that is the Emacs command structure.
";
    assert_eq!(buf.text(), expected);
    // Dot lands on the moved text.
    let printed = run_print("p", &mut buf).unwrap();
    assert_eq!(printed, "manual");
    assert_eq!(buf.text(), expected);
}

#[test]
fn copy_to_destination_end() {
    let mut buf = MemBuffer::new(MANUAL);
    run("/manual/t/haphazard/", &mut buf).unwrap();
    assert_eq!(
        buf.text(),
        "\
This manual is organized in a rather haphazardmanual manner. The first
several sections were written hastily in an attempt to provide a
general introduction to the commands in Emacs and to try to show
the method in the madness that is the Emacs command structure.
"
    );
}

#[test]
fn substitute_first_match() {
    let mut buf = MemBuffer::new(MANUAL);
    run("1,$s/haphazard/thoughtless/", &mut buf).unwrap();
    assert_eq!(
        buf.text(),
        "\
This manual is organized in a rather thoughtless manner. The first
several sections were written hastily in an attempt to provide a
general introduction to the commands in Emacs and to try to show
the method in the madness that is the Emacs command structure.
"
    );
}

#[test]
fn substitute_ampersand_expands_to_match() {
    let mut buf = MemBuffer::new(MANUAL);
    run("1,$s/haphazard/thoughtless&/", &mut buf).unwrap();
    assert_eq!(
        buf.text(),
        "\
This manual is organized in a rather thoughtlesshaphazard manner. The first
several sections were written hastily in an attempt to provide a
general introduction to the commands in Emacs and to try to show
the method in the madness that is the Emacs command structure.
"
    );
}

#[test]
fn substitute_backreference() {
    let mut buf = MemBuffer::new(MANUAL);
    run("1,$s/hapha(zard)/\\1/", &mut buf).unwrap();
    assert_eq!(
        buf.text(),
        "\
This manual is organized in a rather zard manner. The first
several sections were written hastily in an attempt to provide a
general introduction to the commands in Emacs and to try to show
the method in the madness that is the Emacs command structure.
"
    );
}

#[test]
fn substitute_global_flag() {
    let mut buf = MemBuffer::new(MANUAL);
    run("1,$s/Emacs/vi/g", &mut buf).unwrap();
    assert_eq!(
        buf.text(),
        "\
This manual is organized in a rather haphazard manner. The first
several sections were written hastily in an attempt to provide a
general introduction to the commands in vi and to try to show
the method in the madness that is the vi command structure.
"
    );
}

#[test]
fn substitute_nth_match_only() {
    let mut buf = MemBuffer::new(MANUAL);
    run("1,$s2/Emacs/vi/", &mut buf).unwrap();
    assert_eq!(
        buf.text(),
        "\
This manual is organized in a rather haphazard manner. The first
several sections were written hastily in an attempt to provide a
general introduction to the commands in Emacs and to try to show
the method in the madness that is the vi command structure.
"
    );
}

#[test]
fn substitute_identity_is_noop() {
    let mut buf = MemBuffer::new(MANUAL);
    run(",s/[a-z]+/&/g", &mut buf).unwrap();
    assert_eq!(buf.text(), MANUAL);
}

#[test]
fn report_line_number() {
    let mut buf = MemBuffer::new(MANUAL);
    let printed = run_print("2=", &mut buf).unwrap();
    assert_eq!(buf.text(), MANUAL);
    assert_eq!(printed, "2\n");
}

#[test]
fn report_char_offsets() {
    let mut buf = MemBuffer::new(MANUAL);
    let printed = run_print("2=#", &mut buf).unwrap();
    assert_eq!(buf.text(), MANUAL);
    assert_eq!(printed, "#65,#130\n");
}

#[test]
fn report_line_and_offset() {
    let mut buf = MemBuffer::new(MANUAL);
    let printed = run_print("#5,#100=+", &mut buf).unwrap();
    assert_eq!(buf.text(), MANUAL);
    assert_eq!(printed, "1+#5,2+#35\n");
}

#[test]
fn group_swaps_words_in_one_pass() {
    let mut buf = MemBuffer::new(MANUAL);
    run(
        ",x/Emacs|vi/{\ng/Emacs/ c/vi/\ng/vi/ c/Emacs/\n}",
        &mut buf,
    )
    .unwrap();
    assert_eq!(
        buf.text(),
        "\
This manual is organized in a rather haphazard manner. The first
several sections were written hastily in an attempt to proEmacsde a
general introduction to the commands in vi and to try to show
the method in the madness that is the vi command structure.
"
    );
}

#[test]
fn delete_whole_buffer() {
    let mut buf = MemBuffer::new(MANUAL);
    run(",d", &mut buf).unwrap();
    assert_eq!(buf.text(), "");
}

#[test]
fn y_loops_over_gaps_between_matches() {
    let mut buf = MemBuffer::new("a, b, c");
    run(",y/, /d", &mut buf).unwrap();
    assert_eq!(buf.text(), ", , ");
}

#[test]
fn x_without_pattern_loops_over_lines() {
    let mut buf = MemBuffer::new("one\ntwo\nthree\n");
    run(",x g/t/d", &mut buf).unwrap();
    assert_eq!(buf.text(), "one\n");
}

#[test]
fn move_and_copy_of_empty_selection_are_noops() {
    let mut buf = MemBuffer::new("hello\n");
    run("#2,#2m$", &mut buf).unwrap();
    assert_eq!(buf.text(), "hello\n");
    run("#2,#2t$", &mut buf).unwrap();
    assert_eq!(buf.text(), "hello\n");
}

#[test]
fn appended_search_selects_concatenation() {
    // `/X/a/Y/` followed by `/XY/` finds a non-empty range iff X occurred.
    let mut buf = MemBuffer::new("say X twice\n");
    run("/X/a/Y/", &mut buf).unwrap();
    assert_eq!(buf.text(), "say XY twice\n");
    buf.select(0, 0);
    let printed = run_print("/XY/p", &mut buf).unwrap();
    assert_eq!(printed, "XY");
}

#[test]
fn multi_command_program_runs_in_order() {
    let mut buf = MemBuffer::new("alpha\nbeta\n");
    let printed = run_print("1p\n2p", &mut buf).unwrap();
    assert_eq!(printed, "alpha\nbeta\n");
    assert_eq!(buf.text(), "alpha\nbeta\n");
}

#[test]
fn bare_newline_advances_one_line() {
    let mut buf = MemBuffer::new("one\ntwo\nthree\n");
    // Select line one, then a bare newline command moves to line two.
    let printed = run_print("1\n\np", &mut buf).unwrap();
    assert_eq!(printed, "two\n");
}
