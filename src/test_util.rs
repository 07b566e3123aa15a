use crate::{value::ArgValue, warnings::Warnings};

/// Runs `parser` on `input` and compares the result with `expect`.
pub fn generic_parse<F, I, T>(parser: F, input: I, expect: T)
where
    F: Fn(I) -> T,
    T: PartialEq + std::fmt::Debug,
    I: std::fmt::Debug + Clone,
{
    let result = parser(input.clone());
    assert_eq!(
        expect, result,
        "The expect:\r\n({:?}) should be same with the result:\r\n({:?}) for input {:?}",
        expect, result, input
    );
}

/// Like [`generic_parse`] for parsers that also report warnings. `codes` are the
/// warning codes the parse must produce, in order.
pub fn generic_warned_parse<F, I, T>(parser: F, input: I, expect: T, codes: &[&str])
where
    F: Fn(I, &mut Warnings) -> T,
    T: PartialEq + std::fmt::Debug,
    I: std::fmt::Debug + Clone,
{
    let mut warnings = Warnings::new();
    let result = parser(input.clone(), &mut warnings);
    assert_eq!(
        expect, result,
        "The expect:\r\n({:?}) should be same with the result:\r\n({:?}) for input {:?}",
        expect, result, input
    );
    assert_eq!(warnings.codes(), codes, "unexpected warnings for input {:?}", input);
}

/// `curl` followed by `args`, all literal.
pub fn argv(args: &[&str]) -> Vec<ArgValue> {
    std::iter::once("curl")
        .chain(args.iter().copied())
        .map(ArgValue::from)
        .collect()
}
