use hostrpc::rpc::{RpcValue, RpcValueError, take_arg};
use hostrpc_service::{RpcMethodDefinition, expect_arity};

/// `Calc.add(a, b) -> a + b`
pub struct Add;

impl RpcMethodDefinition for Add {
    const HOST_NAME: &'static str = "Calc";
    const METHOD_NAME: &'static str = "add";

    type Input = (i64, i64);
    type Output = i64;

    fn encode_args((a, b): Self::Input) -> Result<Vec<RpcValue>, RpcValueError> {
        Ok(vec![RpcValue::Int(a), RpcValue::Int(b)])
    }

    fn decode_args(args: Vec<RpcValue>) -> Result<Self::Input, RpcValueError> {
        expect_arity(&args, 2)?;
        let mut args = args.into_iter();
        Ok((take_arg(&mut args, 0)?, take_arg(&mut args, 1)?))
    }

    fn encode_return(sum: Self::Output) -> Result<RpcValue, RpcValueError> {
        Ok(RpcValue::Int(sum))
    }

    fn decode_return(value: RpcValue) -> Result<Self::Output, RpcValueError> {
        value.decode()
    }
}
