use super::{output_of, run_full, run_program};
use mbasic::io::{FileSystem, MemoryFileSystem};
use mbasic::program::HaltReason;

#[test]
fn sequential_write_then_read_back() {
    let run = run_program(
        "10 OPEN \"O\", #1, \"T.TXT\"\n\
         20 PRINT #1, \"Hello\"; 42\n\
         30 WRITE #1, \"A\", 1, \"B\"\n\
         40 CLOSE #1\n\
         50 OPEN \"I\", #1, \"T.TXT\"\n\
         60 LINE INPUT #1, L1$\n\
         70 LINE INPUT #1, L2$\n\
         80 CLOSE #1\n\
         90 PRINT L1$ : PRINT L2$",
    );
    assert_eq!(run.reason, HaltReason::End);
    assert_eq!(run.output, "Hello 42 \n\"A\",1,\"B\"\n");
}

#[test]
fn input_hash_splits_fields_across_lines() {
    let fs = MemoryFileSystem::new();
    fs.write_file("D.TXT", b"10,20\n\"a,b\", 30\n");
    let run = run_full(
        "10 OPEN \"I\",#1,\"D.TXT\"\n\
         20 INPUT #1, A, B, C$, D\n\
         30 PRINT A;B;C$;D",
        &[],
        fs,
    );
    assert_eq!(run.reason, HaltReason::End);
    assert_eq!(run.output, " 10  20 a,b 30 \n");
}

#[test]
fn eof_terminates_a_read_loop() {
    let output = output_of(
        "10 OPEN \"O\",#1,\"N.TXT\" : PRINT #1, \"1\" : PRINT #1, \"2\" : CLOSE #1\n\
         20 OPEN \"I\",#1,\"N.TXT\" : T=0\n\
         30 WHILE NOT EOF(1)\n\
         40 LINE INPUT #1, L$ : T = T + 1\n\
         50 WEND\n\
         60 PRINT T : CLOSE #1",
    );
    assert_eq!(output, " 2 \n");
}

#[test]
fn lof_reports_length_in_bytes() {
    let output = output_of(
        "10 OPEN \"O\",#1,\"L.TXT\" : PRINT #1, \"abcde\" : CLOSE #1\n\
         20 OPEN \"I\",#1,\"L.TXT\" : PRINT LOF(1) : CLOSE #1",
    );
    assert_eq!(output, " 6 \n");
}

#[test]
fn append_extends_an_existing_file() {
    let output = output_of(
        "10 OPEN \"O\",#1,\"A.TXT\" : PRINT #1, \"one\" : CLOSE #1\n\
         20 OPEN \"A\",#1,\"A.TXT\" : PRINT #1, \"two\" : CLOSE #1\n\
         30 OPEN \"I\",#1,\"A.TXT\"\n\
         40 LINE INPUT #1, A$ : LINE INPUT #1, B$\n\
         50 PRINT A$; B$ : CLOSE #1",
    );
    assert_eq!(output, "onetwo\n");
}

#[test]
fn kill_and_name_manage_directory_entries() {
    let run = run_program(
        "10 OPEN \"O\",#1,\"A.TXT\" : PRINT #1, \"x\" : CLOSE #1\n\
         20 NAME \"A.TXT\" AS \"B.TXT\"\n\
         30 OPEN \"O\",#2,\"C.TXT\" : CLOSE #2\n\
         40 KILL \"C.TXT\"",
    );
    assert_eq!(run.reason, HaltReason::End);
    assert!(!run.fs.exists("A.TXT"));
    assert!(run.fs.exists("B.TXT"));
    assert!(!run.fs.exists("C.TXT"));
}

#[test]
fn reset_closes_every_file() {
    let run = run_program(
        "10 OPEN \"O\",#1,\"A\" : OPEN \"O\",#2,\"B\"\n\
         20 RESET",
    );
    assert_eq!(run.reason, HaltReason::End);
    assert!(run.interpreter.runtime.files.is_empty());
}

#[test]
fn binary_conversions_round_trip() {
    let output = output_of(
        "10 F=0\n\
         20 FOR I = -32768 TO 32767 STEP 4097\n\
         30 IF CVI(MKI$(I)) <> I THEN F=1\n\
         40 NEXT\n\
         50 IF CVD(MKD$(123.456)) <> 123.456 THEN F=1\n\
         60 IF CVS(MKS$(1.5)) <> 1.5 THEN F=1\n\
         70 IF LEN(MKI$(1)) <> 2 THEN F=1\n\
         80 IF LEN(MKS$(1)) <> 4 THEN F=1\n\
         90 IF LEN(MKD$(1)) <> 8 THEN F=1\n\
         100 PRINT F",
    );
    assert_eq!(output, " 0 \n");
}

#[test]
fn input_string_reads_exact_byte_counts() {
    let output = output_of(
        "10 OPEN \"O\",#1,\"X.TXT\" : PRINT #1, \"ABCDEF\"; : CLOSE #1\n\
         20 OPEN \"I\",#1,\"X.TXT\"\n\
         30 A$ = INPUT$(3, #1) : B$ = INPUT$(3, #1)\n\
         40 CLOSE #1 : PRINT A$; \"/\"; B$",
    );
    assert_eq!(output, "ABC/DEF\n");
}

#[test]
fn get_past_eof_pads_the_record_with_spaces() {
    let output = output_of(
        "10 OPEN \"R\",#1,\"R.DAT\",4\n\
         20 FIELD #1, 4 AS F$\n\
         30 GET #1, 2\n\
         40 PRINT LEN(F$); ASC(F$)",
    );
    assert_eq!(output, " 4  32 \n");
}

#[test]
fn sequential_get_put_advance_the_record_pointer() {
    let run = run_program(
        "10 OPEN \"R\",#1,\"S.DAT\",2\n\
         20 FIELD #1, 2 AS F$\n\
         30 LSET F$=\"ab\" : PUT #1\n\
         40 LSET F$=\"cd\" : PUT #1\n\
         50 GET #1, 1 : PRINT F$;\n\
         60 GET #1 : PRINT F$\n\
         70 CLOSE #1",
    );
    assert_eq!(run.reason, HaltReason::End);
    assert_eq!(run.output, "abcd\n");
    assert_eq!(run.fs.read_file("S.DAT").unwrap(), b"abcd".to_vec());
}

#[test]
fn rset_right_justifies_in_the_field() {
    let output = output_of(
        "10 OPEN \"R\",#1,\"J.DAT\",8\n\
         20 FIELD #1, 8 AS F$\n\
         30 RSET F$=\"42\"\n\
         40 PRINT F$; \"|\"",
    );
    assert_eq!(output, "      42|\n");
}

#[test]
fn loc_reports_the_current_record() {
    let output = output_of(
        "10 OPEN \"R\",#1,\"P.DAT\",10\n\
         20 FIELD #1, 10 AS F$\n\
         30 LSET F$=\"x\" : PUT #1, 1 : PUT #1, 2 : PUT #1, 3\n\
         40 PRINT LOC(1)\n\
         50 CLOSE #1",
    );
    assert_eq!(output, " 3 \n");
}
