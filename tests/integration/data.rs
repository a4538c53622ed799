use super::{output_of, run_with_input};
use mbasic::program::HaltReason;

#[test]
fn read_walks_data_in_program_order() {
    let output = output_of(
        "10 DATA 1,2\n\
         20 DATA 3,4\n\
         30 READ A,B,C,D\n\
         40 PRINT A;B;C;D",
    );
    assert_eq!(output, " 1  2  3  4 \n");
}

#[test]
fn restore_targets_a_line() {
    let output = output_of(
        "10 DATA 1,2\n\
         20 DATA 3,4\n\
         30 READ A,B,C : RESTORE 20 : READ D\n\
         40 PRINT A;B;C;D",
    );
    assert_eq!(output, " 1  2  3  3 \n");
}

#[test]
fn restore_between_lines_finds_the_next_data_line() {
    let output = output_of(
        "10 DATA 1\n\
         30 DATA 3\n\
         40 RESTORE 20 : READ A : PRINT A",
    );
    assert_eq!(output, " 3 \n");
}

#[test]
fn unquoted_and_quoted_strings_read_into_string_targets() {
    let output = output_of(
        "10 READ A$, B$ : PRINT A$; \"/\"; B$\n\
         20 DATA HELLO WORLD, \"Quoted, text\"",
    );
    assert_eq!(output, "HELLO WORLD/Quoted, text\n");
}

#[test]
fn input_splits_on_commas_and_coerces() {
    let run = run_with_input("10 INPUT A, B$, C\n20 PRINT A; B$; C", &["1, hi , 2.5"]);
    assert_eq!(run.reason, HaltReason::End);
    // Prompt, echoed input, then the assigned values.
    assert_eq!(run.output, "? 1, hi , 2.5\n 1 hi 2.5 \n");
}

#[test]
fn input_with_too_few_values_assigns_what_arrived() {
    let run = run_with_input("10 B = 9\n20 INPUT A, B\n30 PRINT A; B", &["7"]);
    assert_eq!(run.reason, HaltReason::End);
    assert_eq!(run.output, "? 7\n 7  9 \n");
}

#[test]
fn unparsable_numeric_input_degrades_to_zero() {
    let run = run_with_input("10 INPUT A\n20 PRINT A", &["garbage"]);
    assert_eq!(run.output, "? garbage\n 0 \n");
}

#[test]
fn input_prompt_replaces_the_question_mark() {
    let run = run_with_input("10 INPUT \"Name: \"; N$\n20 PRINT N$", &["Ada"]);
    assert_eq!(run.output, "Name: Ada\nAda\n");
}

#[test]
fn line_input_takes_the_line_verbatim() {
    let run = run_with_input("10 LINE INPUT L$\n20 PRINT L$", &["a, b, \"c\""]);
    assert_eq!(run.output, "a, b, \"c\"\na, b, \"c\"\n");
}
