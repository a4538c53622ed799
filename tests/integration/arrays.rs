use super::{output_of, run_program};
use mbasic::program::HaltReason;

#[test]
fn first_subscript_use_dimensions_to_ten() {
    let output = output_of("10 A(10) = 7\n20 PRINT A(10); A(0)");
    assert_eq!(output, " 7  0 \n");
}

#[test]
fn multi_dimensional_indexing() {
    let output = output_of(
        "10 DIM A(2,3)\n\
         20 FOR I=0 TO 2 : FOR J=0 TO 3 : A(I,J) = I*10+J : NEXT J,I\n\
         30 PRINT A(2,3); A(0,0); A(1,2)",
    );
    assert_eq!(output, " 23  0  12 \n");
}

#[test]
fn option_base_one_shifts_every_array() {
    let output = output_of(
        "10 OPTION BASE 1\n\
         20 DIM A(2)\n\
         30 A(1)=1 : A(2)=2\n\
         40 PRINT A(1)+A(2)",
    );
    assert_eq!(output, " 3 \n");

    let run = run_program("10 OPTION BASE 1\n20 DIM A(2)\n30 A(0) = 1");
    assert_eq!(run.reason, HaltReason::Error);
}

#[test]
fn erase_frees_the_name_for_redimensioning() {
    let output = output_of("10 DIM A(5) : A(1) = 7 : ERASE A : DIM A(2) : PRINT A(1)");
    assert_eq!(output, " 0 \n");
}

#[test]
fn scalars_and_arrays_share_a_name_without_sharing_storage() {
    let output = output_of("10 A = 5 : A(3) = 7 : PRINT A; A(3)");
    assert_eq!(output, " 5  7 \n");
}

#[test]
fn string_arrays_hold_strings() {
    let output = output_of("10 DIM N$(3)\n20 N$(2) = \"hi\"\n30 PRINT N$(2); N$(1); LEN(N$(2))");
    assert_eq!(output, "hi 2 \n");
}

#[test]
fn dimension_bounds_may_be_expressions() {
    let output = output_of("10 N = 4\n20 DIM A(N * 2)\n30 A(8) = 1 : PRINT A(8)");
    assert_eq!(output, " 1 \n");
}

#[test]
fn integer_arrays_coerce_on_store() {
    let output = output_of("10 DIM A%(2)\n20 A%(1) = 2.5\n30 PRINT A%(1)");
    assert_eq!(output, " 2 \n");
}

#[test]
fn deftype_applies_to_array_names() {
    let output = output_of("10 DEFINT A\n20 DIM A(2)\n30 A(1) = 7.7\n40 PRINT A(1)");
    assert_eq!(output, " 8 \n");
}
