use super::output_of;

#[test]
fn chr_asc_identity_over_the_byte_range() {
    let output = output_of(
        "10 F = 0\n\
         20 FOR I = 0 TO 255\n\
         30 IF ASC(CHR$(I)) <> I THEN F = 1\n\
         40 NEXT I\n\
         50 PRINT F",
    );
    assert_eq!(output, " 0 \n");
}

#[test]
fn string_repeats_are_homogeneous() {
    let output = output_of(
        "10 A$ = STRING$(40, 42) : F = 0\n\
         20 IF LEN(A$) <> 40 THEN F = 1\n\
         30 FOR I = 1 TO 40\n\
         40 IF MID$(A$, I, 1) <> \"*\" THEN F = 1\n\
         50 NEXT\n\
         60 IF STRING$(3, \"AB\") <> \"AAA\" THEN F = 1\n\
         70 PRINT F",
    );
    assert_eq!(output, " 0 \n");
}

#[test]
fn left_mid_partition_reassembles_the_string() {
    let output = output_of(
        "10 S$ = \"Hello, World\" : F = 0\n\
         20 FOR K = 0 TO LEN(S$)\n\
         30 IF LEFT$(S$, K) + MID$(S$, K + 1) <> S$ THEN F = 1\n\
         40 NEXT K\n\
         50 PRINT F",
    );
    assert_eq!(output, " 0 \n");
}

#[test]
fn left_and_right_clamp_to_the_whole_string() {
    assert_eq!(output_of("10 PRINT LEFT$(\"abc\", 9)"), "abc\n");
    assert_eq!(output_of("10 PRINT RIGHT$(\"abc\", 9)"), "abc\n");
    assert_eq!(output_of("10 PRINT RIGHT$(\"abcde\", 2)"), "de\n");
}

#[test]
fn instr_positions_are_one_based() {
    assert_eq!(output_of("10 PRINT INSTR(\"banana\", \"an\")"), " 2 \n");
    assert_eq!(output_of("10 PRINT INSTR(3, \"banana\", \"an\")"), " 4 \n");
    assert_eq!(output_of("10 PRINT INSTR(\"banana\", \"xyz\")"), " 0 \n");
    assert_eq!(output_of("10 PRINT INSTR(\"banana\", \"\")"), " 1 \n");
    assert_eq!(output_of("10 PRINT INSTR(4, \"abc\", \"a\")"), " 0 \n");
}

#[test]
fn mid_assignment_never_changes_the_length() {
    assert_eq!(
        output_of("10 A$ = \"ABCDEF\"\n20 MID$(A$, 3, 2) = \"xy\"\n30 PRINT A$; LEN(A$)"),
        "ABxyEF 6 \n"
    );
    assert_eq!(
        output_of("10 A$ = \"ABCDEF\"\n20 MID$(A$, 5) = \"ZZZZZ\"\n30 PRINT A$; LEN(A$)"),
        "ABCDZZ 6 \n"
    );
}

#[test]
fn string_comparison_is_lexicographic() {
    let output = output_of(
        "10 IF \"abc\" < \"abd\" THEN PRINT \"lt\"\n\
         20 IF \"abc\" = \"abc\" THEN PRINT \"eq\"\n\
         30 IF \"b\" > \"ab\" THEN PRINT \"gt\"",
    );
    assert_eq!(output, "lt\neq\ngt\n");
}

#[test]
fn plus_with_a_numeric_operand_keeps_the_string_part() {
    assert_eq!(output_of("10 PRINT \"A\" + 5"), "A\n");
    assert_eq!(output_of("10 PRINT 5 + \"A\""), "A\n");
}

#[test]
fn str_and_val_are_inverses() {
    assert_eq!(output_of("10 PRINT STR$(5)"), " 5\n");
    assert_eq!(output_of("10 PRINT STR$(-3.25)"), "-3.25\n");
    assert_eq!(output_of("10 PRINT VAL(\"12.5\"); VAL(\"junk\")"), " 12.5  0 \n");
    assert_eq!(output_of("10 PRINT VAL(\"&H10\")"), " 16 \n");
    let output = output_of(
        "10 A# = 123.4567 : F = 0\n\
         20 IF VAL(STR$(A#)) <> A# THEN F = 1\n\
         30 IF VAL(STR$(-0.001)) <> -0.001 THEN F = 1\n\
         40 PRINT F",
    );
    assert_eq!(output, " 0 \n");
}

#[test]
fn hex_and_oct_render_the_sixteen_bit_pattern() {
    assert_eq!(output_of("10 PRINT HEX$(255)"), "FF\n");
    assert_eq!(output_of("10 PRINT HEX$(-1)"), "FFFF\n");
    assert_eq!(output_of("10 PRINT OCT$(8)"), "10\n");
}

#[test]
fn space_builds_blank_runs() {
    assert_eq!(output_of("10 PRINT \"a\"; SPACE$(3); \"b\""), "a   b\n");
    assert_eq!(output_of("10 PRINT LEN(SPACE$(0))"), " 0 \n");
}

#[test]
fn deftype_makes_suffixless_strings() {
    let output = output_of("10 DEFSTR S\n20 S1 = \"hi\"\n30 PRINT S1; LEN(S1)");
    assert_eq!(output, "hi 2 \n");
}
