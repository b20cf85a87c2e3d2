use clap::Parser;
use rdiff::cli::{Cli, run};
use rdiff::derivative::DiffError;

fn invoke(args: &[&str]) -> Result<String, DiffError> {
    let argv = std::iter::once("rdiff").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv).expect("arguments parse");
    run(&cli)
}

#[test]
fn default_is_first_derivative_in_x() {
    assert_eq!(invoke(&["x**2"]).unwrap(), "2*x");
}

#[test]
fn order_variable_and_latex_flags() {
    assert_eq!(invoke(&["x**3", "-o", "2"]).unwrap(), "6*x");
    assert_eq!(invoke(&["t**2 + x", "--variable", "t"]).unwrap(), "2*t");
    assert_eq!(invoke(&["x**2", "-l"]).unwrap(), "2 x");
}

#[test]
fn steps_print_the_table_then_the_result() {
    let out = invoke(&["sin(x)", "-s"]).unwrap();
    assert_eq!(
        out,
        "Derivative steps (d/dx)\n\
         +--------+--------+\n\
         | Step 1 | sin(x) |\n\
         | Step 2 | cos(x) |\n\
         +--------+--------+\n\
         \n\
         Final result:\n\
         cos(x)"
    );
}

#[test]
fn bad_orders_are_input_errors() {
    for order in ["0", "-1", "11", "1.5", "two"] {
        assert!(
            matches!(invoke(&["x", "-o", order]), Err(DiffError::InputValidation(_))),
            "order {order}"
        );
    }
    assert!(invoke(&["x**11", "-o", "11", "--max-order", "11"]).is_ok());
}

#[test]
fn errors_are_prefixed_by_kind() {
    let err = invoke(&["foo(x)"]).unwrap_err();
    assert!(err.to_string().starts_with("unsupported expression:"), "{err}");
    let err = invoke(&["x", "-v", "1y"]).unwrap_err();
    assert!(err.to_string().starts_with("input error:"), "{err}");
    assert_eq!(err.kind(), "input");
}
