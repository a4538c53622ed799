use super::{output_of, run_program};
use mbasic::program::HaltReason;

#[test]
fn for_loop_value_sequence() {
    let output = output_of("10 FOR I=1 TO 10 STEP 3 : PRINT I; : NEXT\n20 END");
    assert_eq!(output, " 1  4  7  10 ");
}

#[test]
fn for_loop_negative_step() {
    let output = output_of("10 FOR I=3 TO 1 STEP -1 : PRINT I; : NEXT I\n20 END");
    assert_eq!(output, " 3  2  1 ");
}

#[test]
fn zero_trip_for_skips_to_after_next() {
    let output = output_of("10 FOR I=5 TO 1 : PRINT \"X\" : NEXT : PRINT \"done\"");
    assert_eq!(output, "done\n");
}

#[test]
fn loop_variable_holds_the_first_exceeding_value() {
    let output = output_of("10 FOR I=1 TO 3 : NEXT\n20 PRINT I");
    assert_eq!(output, " 4 \n");
}

#[test]
fn next_with_variable_list_closes_nested_loops() {
    let output = output_of(
        "10 FOR I=1 TO 2 : FOR J=1 TO 2 : PRINT I;J; : NEXT J,I\n20 PRINT \"end\"",
    );
    assert_eq!(output, " 1  1  1  2  2  1  2  2 end\n");
}

#[test]
fn while_loops_nest() {
    let output = output_of(
        "10 I=0\n\
         20 WHILE I < 2\n\
         30 J=0\n\
         40 WHILE J < 2\n\
         50 PRINT I*2+J;\n\
         60 J=J+1\n\
         70 WEND\n\
         80 I=I+1\n\
         90 WEND\n",
    );
    assert_eq!(output, " 0  1  2  3 ");
}

#[test]
fn false_while_skips_past_the_matching_wend() {
    let output = output_of(
        "10 WHILE 0\n\
         20 WHILE 1\n\
         30 WEND\n\
         40 WEND\n\
         50 PRINT \"out\"",
    );
    assert_eq!(output, "out\n");
}

#[test]
fn gosub_return_leaves_the_stack_balanced() {
    let run = run_program(
        "10 GOSUB 100\n\
         20 GOSUB 100\n\
         30 END\n\
         100 GOSUB 200 : RETURN\n\
         200 RETURN\n",
    );
    assert_eq!(run.reason, HaltReason::End);
    assert!(run.interpreter.runtime.exec_stack.is_empty());
    assert!(run.interpreter.runtime.for_stack.is_empty());
}

#[test]
fn return_discards_while_context_entered_after_the_gosub() {
    let output = output_of(
        "10 GOSUB 100\n\
         20 PRINT \"back\" : END\n\
         100 WHILE 1\n\
         110 RETURN\n\
         120 WEND\n",
    );
    assert_eq!(output, "back\n");
}

#[test]
fn on_goto_selects_by_index() {
    let output = output_of(
        "10 X=2 : ON X GOTO 100,200,300\n\
         100 PRINT \"one\" : END\n\
         200 PRINT \"two\" : END\n\
         300 PRINT \"three\" : END\n",
    );
    assert_eq!(output, "two\n");
}

#[test]
fn on_goto_out_of_range_falls_through() {
    let output = output_of("10 ON 5 GOTO 100,200\n20 PRINT \"through\"\n100 END\n200 END");
    assert_eq!(output, "through\n");
}

#[test]
fn on_gosub_returns_to_the_following_statement() {
    let output = output_of(
        "10 ON 1 GOSUB 100 : PRINT \"after\"\n\
         20 END\n\
         100 PRINT \"sub\" : RETURN\n",
    );
    assert_eq!(output, "sub\nafter\n");
}

#[test]
fn inline_then_statements_run_in_order() {
    let output = output_of("10 IF 1 THEN PRINT \"a\" : PRINT \"b\"\n20 PRINT \"c\"");
    assert_eq!(output, "a\nb\nc\n");
}

#[test]
fn else_branch_takes_the_rest_of_the_line() {
    let output = output_of("10 IF 0 THEN PRINT \"a\" ELSE PRINT \"b\" : PRINT \"c\"\n20 PRINT \"d\"");
    assert_eq!(output, "b\nc\nd\n");
}

#[test]
fn jump_inside_a_branch_aborts_the_rest_of_it() {
    let output = output_of(
        "10 IF 1 THEN PRINT \"a\" : GOTO 30 : PRINT \"x\"\n\
         20 PRINT \"skip\"\n\
         30 PRINT \"done\"",
    );
    assert_eq!(output, "a\ndone\n");
}

#[test]
fn string_conditions_are_true_when_non_empty() {
    let output = output_of("10 A$=\"x\" : IF A$ THEN PRINT \"yes\" ELSE PRINT \"no\"");
    assert_eq!(output, "yes\n");
}

#[test]
fn stop_is_resumable() {
    let mut run = run_program("10 PRINT \"one\"\n20 STOP\n30 PRINT \"two\"");
    assert_eq!(run.reason, HaltReason::Stop);
    assert_eq!(run.console.output(), "one\n");
    assert!(run.interpreter.cont());
    assert_eq!(run.interpreter.run(), HaltReason::End);
    assert_eq!(run.console.output(), "one\ntwo\n");
}

#[test]
fn breakpoints_halt_before_the_line_runs() {
    let program = mbparse::parse("10 PRINT \"a\"\n20 PRINT \"b\"").unwrap();
    let console = mbasic::io::MemoryConsole::new();
    let mut interpreter = mbasic::interpreter::Interpreter::new(
        program,
        Box::new(console.clone()),
        Box::new(mbasic::io::MemoryFileSystem::new()),
    );
    interpreter.runtime.breakpoints.insert(20);
    assert_eq!(interpreter.run(), HaltReason::Breakpoint);
    assert_eq!(console.output(), "a\n");
    assert!(interpreter.cont());
    assert_eq!(interpreter.run(), HaltReason::End);
    assert_eq!(console.output(), "a\nb\n");
}

#[test]
fn tron_traces_line_numbers() {
    let output = output_of("10 TRON\n20 PRINT \"x\"\n30 TROFF\n40 PRINT \"y\"");
    assert_eq!(output, "[20]x\n[30]y\n");
}

#[test]
fn run_statement_publishes_a_request_and_rerun_starts_clean() {
    let mut run = run_program("10 X=5 : RUN 30\n30 PRINT X");
    assert_eq!(run.reason, HaltReason::End);
    let request = run.interpreter.take_request().expect("run request");
    assert_eq!(request.file, None);
    assert_eq!(request.start_line, Some(30));
    assert!(!request.keep_variables);

    run.interpreter.rerun(request.start_line, request.keep_variables);
    assert_eq!(run.interpreter.run(), HaltReason::End);
    assert_eq!(run.console.output(), " 0 \n");
}

#[test]
fn chain_preserves_common_variables_only() {
    let mut run = run_program("10 COMMON A\n20 A=7 : B=9 : CHAIN \"P2.BAS\"");
    assert_eq!(run.reason, HaltReason::End);
    let request = run.interpreter.take_request().expect("chain request");
    assert_eq!(request.file.as_deref(), Some("P2.BAS"));

    let second = mbparse::parse("10 PRINT A; B").unwrap();
    run.interpreter.chain(second, &request);
    assert_eq!(run.interpreter.run(), HaltReason::End);
    assert_eq!(run.console.output(), " 7  0 \n");
}

#[test]
fn chain_all_preserves_everything() {
    let mut run = run_program("10 A=7 : B=9 : CHAIN \"P2.BAS\", , ALL");
    let request = run.interpreter.take_request().expect("chain request");
    assert!(request.keep_variables);

    let second = mbparse::parse("10 PRINT A; B").unwrap();
    run.interpreter.chain(second, &request);
    assert_eq!(run.interpreter.run(), HaltReason::End);
    assert_eq!(run.console.output(), " 7  9 \n");
}

#[test]
fn clear_drops_variables_but_keeps_functions() {
    let output = output_of(
        "10 DEF FN T(X) = X + 1\n\
         20 A = 5 : DIM B(3)\n\
         30 CLEAR\n\
         40 PRINT A; FN T(1)",
    );
    assert_eq!(output, " 0  2 \n");
}

#[test]
fn swap_exchanges_values() {
    let output = output_of("10 A=1 : B=2 : SWAP A,B : PRINT A;B");
    assert_eq!(output, " 2  1 \n");
}

#[test]
fn goto_reenters_loops() {
    // A GOTO back to the FOR header restarts the loop record in place.
    let output = output_of(
        "10 T = T + 1\n\
         20 FOR I=1 TO 2\n\
         30 NEXT\n\
         40 IF T < 3 THEN 10\n\
         50 PRINT T",
    );
    assert_eq!(output, " 3 \n");
}
