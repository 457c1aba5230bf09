use hostrpc::rpc::{RpcValue, RpcValueError};

// These are optional helper traits that give call sites a typed view of a
// host method. The core protocol only moves `RpcValue`s; a definition couples
// the host and method names with the conversion logic in a single location,
// and both the caller side (`RpcCallTyped`) and the host side
// (`RpcHostObject::with_typed_method`) reuse it.

/// A single method exposed by a remote host.
pub trait RpcMethodDefinition {
    /// Name the host is registered under.
    const HOST_NAME: &'static str;

    /// Name of the method on that host.
    const METHOD_NAME: &'static str;

    /// The high-level input type expected by the argument encoder (e.g., `Vec<f64>`).
    type Input;

    /// The high-level output type produced by the return decoder (e.g., `f64`).
    type Output;

    /// Encodes the input into positional arguments.
    fn encode_args(input: Self::Input) -> Result<Vec<RpcValue>, RpcValueError>;

    /// Decodes positional arguments back into the typed input.
    fn decode_args(args: Vec<RpcValue>) -> Result<Self::Input, RpcValueError>;

    /// Encodes the method's result.
    fn encode_return(output: Self::Output) -> Result<RpcValue, RpcValueError>;

    /// Decodes a return value into the typed output.
    fn decode_return(value: RpcValue) -> Result<Self::Output, RpcValueError>;
}

/// Checks that exactly `expected` arguments were supplied.
///
/// Intended for `decode_args` implementations that take a fixed arity.
pub fn expect_arity(args: &[RpcValue], expected: usize) -> Result<(), RpcValueError> {
    if args.len() == expected {
        return Ok(());
    }

    if args.len() < expected {
        Err(RpcValueError::MissingArgument {
            position: args.len(),
        })
    } else {
        Err(RpcValueError::UnexpectedArguments {
            expected,
            found: args.len(),
        })
    }
}
