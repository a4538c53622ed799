use super::output_of;

#[test]
fn semicolon_abuts_and_comma_tabs_to_zones() {
    assert_eq!(output_of("10 PRINT \"A\"; \"B\""), "AB\n");
    assert_eq!(output_of("10 PRINT \"A\", \"B\""), "A             B\n");
    assert_eq!(
        output_of("10 PRINT \"ABCDEFGHIJKLMNOP\", \"B\""),
        "ABCDEFGHIJKLMNOP            B\n"
    );
}

#[test]
fn adjacent_expressions_get_one_space() {
    assert_eq!(output_of("10 PRINT \"A\" \"B\""), "A B\n");
}

#[test]
fn leading_comma_tabs_before_the_first_item() {
    assert_eq!(output_of("10 PRINT ,\"X\""), "              X\n");
}

#[test]
fn numbers_carry_sign_slot_and_trailing_space() {
    assert_eq!(output_of("10 PRINT 5"), " 5 \n");
    assert_eq!(output_of("10 PRINT -5"), "-5 \n");
    assert_eq!(output_of("10 PRINT 0.5"), " 0.5 \n");
    assert_eq!(output_of("10 PRINT 2.50"), " 2.5 \n");
    assert_eq!(output_of("10 PRINT 1E3"), " 1000 \n");
}

#[test]
fn single_precision_results_print_short() {
    // 0.1 + 0.2 lands in a SINGLE variable and prints as .3, not as the
    // double-precision artifact.
    assert_eq!(output_of("10 A = 0.1 + 0.2\n20 PRINT A"), " 0.3 \n");
}

#[test]
fn bare_print_emits_a_newline() {
    assert_eq!(output_of("10 PRINT \"A\"\n20 PRINT\n30 PRINT \"B\""), "A\n\nB\n");
}

#[test]
fn trailing_semicolon_joins_lines() {
    assert_eq!(output_of("10 PRINT \"A\";\n20 PRINT \"B\""), "AB\n");
}

#[test]
fn tab_moves_to_a_one_based_column() {
    assert_eq!(output_of("10 PRINT TAB(5); \"X\""), "    X\n");
    assert_eq!(output_of("10 PRINT \"ABCDEF\"; TAB(3); \"X\""), "ABCDEFX\n");
}

#[test]
fn spc_emits_a_fixed_gap() {
    assert_eq!(output_of("10 PRINT \"A\"; SPC(3); \"B\""), "A   B\n");
}

#[test]
fn pos_reports_the_one_based_column() {
    assert_eq!(output_of("10 PRINT \"AB\"; POS(0)"), "AB 3 \n");
}

#[test]
fn width_wraps_comma_zones() {
    assert_eq!(
        output_of("10 WIDTH 20\n20 PRINT \"A\", \"B\", \"C\""),
        "A             B\nC\n"
    );
}

#[test]
fn question_mark_prints() {
    assert_eq!(output_of("10 ? \"HI\""), "HI\n");
}

#[test]
fn lprint_routes_to_the_console() {
    assert_eq!(output_of("10 LPRINT \"X\"; 1"), "X 1 \n");
}

#[test]
fn print_using_formats_numeric_fields() {
    assert_eq!(output_of("10 PRINT USING \"##.##\"; 3.149"), " 3.15\n");
    assert_eq!(
        output_of("10 PRINT USING \"Total: $$###.##\"; 12.5"),
        "Total:   $12.50\n"
    );
    assert_eq!(
        output_of("10 PRINT USING \"###\"; 1; 2; 3"),
        "  1  2  3\n"
    );
}

#[test]
fn print_using_formats_string_fields() {
    assert_eq!(output_of("10 PRINT USING \"!\"; \"Hello\""), "H\n");
    assert_eq!(output_of("10 PRINT USING \"&!\"; \"ab\"; \"cd\""), "abc\n");
}

#[test]
fn cls_clears_and_homes() {
    assert_eq!(output_of("10 PRINT \"A\"\n20 CLS\n30 PRINT \"B\""), "B\n");
}
