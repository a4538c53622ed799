use super::{error_of, output_of, run_full, run_program};
use mbasic::error::ErrorCode;
use mbasic::io::MemoryFileSystem;
use mbasic::program::HaltReason;

fn assert_error(source: &str, code: ErrorCode) {
    let error = error_of(source);
    assert!(
        error.is(code),
        "expected {:?} ({}), got code {}",
        code,
        code as i16,
        error.code
    );
}

#[test]
fn control_flow_errors() {
    assert_error("10 NEXT", ErrorCode::NextWithoutFor);
    assert_error("10 RETURN", ErrorCode::ReturnWithoutGosub);
    assert_error("10 WEND", ErrorCode::WendWithoutWhile);
    assert_error("10 WHILE 0", ErrorCode::WhileWithoutWend);
    assert_error("10 FOR I=5 TO 1", ErrorCode::ForWithoutNext);
    assert_error("10 GOTO 99", ErrorCode::UndefinedLineNumber);
    assert_error("10 ON 1 GOSUB 99", ErrorCode::UndefinedLineNumber);
}

#[test]
fn data_and_type_errors() {
    assert_error("10 READ A", ErrorCode::OutOfData);
    assert_error("10 READ A\n20 DATA X", ErrorCode::TypeMismatch);
    assert_error("10 A$ = 5", ErrorCode::TypeMismatch);
    assert_error("10 A = \"x\" : B = 1", ErrorCode::TypeMismatch);
    assert_error("10 A$=\"x\" : SWAP A$, B", ErrorCode::TypeMismatch);
    assert_error("10 A = \"a\" < 1", ErrorCode::TypeMismatch);
}

#[test]
fn arithmetic_errors() {
    assert_error("10 A = 1/0", ErrorCode::DivisionByZero);
    assert_error("10 A = 1 \\ 0", ErrorCode::DivisionByZero);
    assert_error("10 A = 1 MOD 0", ErrorCode::DivisionByZero);
    assert_error("10 A = SQR(-1)", ErrorCode::IllegalFunctionCall);
    assert_error("10 A = LOG(0)", ErrorCode::IllegalFunctionCall);
    assert_error("10 A = (-2) ^ 0.5", ErrorCode::IllegalFunctionCall);
}

#[test]
fn array_errors() {
    assert_error("10 DIM A(3)\n20 A(4) = 1", ErrorCode::SubscriptOutOfRange);
    assert_error("10 A(11) = 1", ErrorCode::SubscriptOutOfRange);
    assert_error("10 DIM A(3) : DIM A(3)", ErrorCode::DuplicateDefinition);
    assert_error("10 DIM A(3) : OPTION BASE 1", ErrorCode::DuplicateDefinition);
    assert_error("10 ERASE A", ErrorCode::IllegalFunctionCall);
}

#[test]
fn string_errors() {
    assert_error(
        "10 A$ = STRING$(255, 65) + \"Y\"",
        ErrorCode::StringTooLong,
    );
    assert_error("10 A = ASC(\"\")", ErrorCode::IllegalFunctionCall);
    assert_error("10 A$ = CHR$(256)", ErrorCode::IllegalFunctionCall);
    assert_error("10 A$ = LEFT$(\"x\", -1)", ErrorCode::IllegalFunctionCall);
    assert_error("10 A$ = \"abc\" : MID$(A$, 9) = \"x\"", ErrorCode::IllegalFunctionCall);
}

#[test]
fn function_errors() {
    assert_error("10 A = FNQ(1)", ErrorCode::UndefinedUserFunction);
    assert_error(
        "10 DEF FN R(X) = FN R(X)\n20 A = FN R(1)",
        ErrorCode::OutOfMemory,
    );
}

#[test]
fn resume_discipline() {
    assert_error("10 RESUME", ErrorCode::ResumeWithoutError);
    assert_error(
        "10 ON ERROR GOTO 100\n20 ERROR 5\n100 END",
        ErrorCode::NoResume,
    );
}

#[test]
fn error_statement_raises_custom_codes() {
    let error = error_of("10 ERROR 99");
    assert_eq!(error.code, 99);
    assert_eq!(error.message(), "Unprintable error");
    assert_eq!(error.line, Some(10));

    let error = error_of("10 ERROR 6");
    assert!(error.is(ErrorCode::Overflow));
    assert_eq!(error.to_string(), "Overflow in 10");
}

#[test]
fn file_errors() {
    assert_error("10 PRINT #3, 1", ErrorCode::BadFileNumber);
    assert_error("10 OPEN \"I\", #20, \"F\"", ErrorCode::BadFileNumber);
    assert_error("10 OPEN \"I\", #1, \"NOPE\"", ErrorCode::FileNotFound);
    assert_error("10 KILL \"NOPE\"", ErrorCode::FileNotFound);
    assert_error("10 OPEN \"X\", #1, \"F\"", ErrorCode::BadFileMode);
    assert_error("10 OPEN \"O\", #1, \"\"", ErrorCode::BadFileName);
    assert_error(
        "10 OPEN \"O\",#1,\"F\" : OPEN \"O\",#1,\"G\"",
        ErrorCode::FileAlreadyOpen,
    );
    assert_error(
        "10 OPEN \"O\",#1,\"F\" : GET #1",
        ErrorCode::BadFileMode,
    );
    assert_error(
        "10 OPEN \"R\",#1,\"F\",10 : FIELD #1, 20 AS A$",
        ErrorCode::FieldOverflow,
    );
    assert_error(
        "10 OPEN \"R\",#1,\"F\",10 : FIELD #1, 10 AS A",
        ErrorCode::TypeMismatch,
    );
    assert_error(
        "10 OPEN \"R\",#1,\"F\",10 : GET #1, 0",
        ErrorCode::BadRecordNumber,
    );
    assert_error("10 LSET A$ = \"x\"", ErrorCode::IllegalFunctionCall);
}

#[test]
fn input_past_end() {
    let fs = MemoryFileSystem::new();
    fs.write_file("ONE.TXT", b"only\n");
    let run = run_full(
        "10 OPEN \"I\",#1,\"ONE.TXT\"\n20 LINE INPUT #1, A$\n30 LINE INPUT #1, B$",
        &[],
        fs,
    );
    assert_eq!(run.reason, HaltReason::Error);
    assert!(run
        .interpreter
        .last_error()
        .unwrap()
        .is(ErrorCode::InputPastEnd));
}

#[test]
fn trapped_errors_set_err_and_erl() {
    let output = output_of(
        "10 ON ERROR GOTO 100\n\
         20 ERROR 53\n\
         30 PRINT \"resumed\" : END\n\
         100 PRINT ERR; ERL : RESUME NEXT",
    );
    assert_eq!(output, " 53  20 \nresumed\n");
}

#[test]
fn resume_to_a_line_clears_the_error_state() {
    let output = output_of(
        "10 ON ERROR GOTO 100\n\
         20 A = 1/0\n\
         30 PRINT \"no\"\n\
         40 PRINT \"recovered\" : END\n\
         100 RESUME 40",
    );
    assert_eq!(output, "recovered\n");
}

#[test]
fn on_error_gosub_handlers_use_a_frame() {
    let run = run_program(
        "10 ON ERROR GOSUB 100\n\
         20 ERROR 5\n\
         30 PRINT \"after\" : END\n\
         100 PRINT \"handled\" : RESUME NEXT",
    );
    assert_eq!(run.reason, HaltReason::End);
    assert_eq!(run.output, "handled\nafter\n");
    assert!(run.interpreter.runtime.exec_stack.is_empty());
}

#[test]
fn errors_inside_the_handler_are_fatal() {
    let run = run_program("10 ON ERROR GOTO 100\n20 A = 1/0\n100 B = 1/0");
    assert_eq!(run.reason, HaltReason::Error);
    let error = run.interpreter.last_error().unwrap();
    assert!(error.is(ErrorCode::DivisionByZero));
    assert_eq!(error.line, Some(100));
}

#[test]
fn on_error_goto_zero_disables_trapping() {
    let run = run_program(
        "10 ON ERROR GOTO 100\n\
         20 ON ERROR GOTO 0\n\
         30 A = 1/0\n\
         100 RESUME NEXT",
    );
    assert_eq!(run.reason, HaltReason::Error);
}

#[test]
fn falling_off_the_end_inside_a_handler_is_no_resume() {
    let run = run_program("10 ON ERROR GOTO 100\n20 ERROR 5\n100 B = 1");
    assert_eq!(run.reason, HaltReason::Error);
    assert!(run
        .interpreter
        .last_error()
        .unwrap()
        .is(ErrorCode::NoResume));
}
