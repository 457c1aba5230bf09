use crate::{RpcServiceCallerInterface, error::RpcCallerError};
use hostrpc_service::RpcMethodDefinition;

/// Trait for types that represent callable typed RPC methods.
///
/// This trait forms the final layer of abstraction, allowing downstream
/// users to write `T::call(&caller, input)` without dealing with argument
/// encoding or result decoding explicitly.
#[async_trait::async_trait]
pub trait RpcCallTyped: RpcMethodDefinition + Sized + Send + Sync {
    async fn call<C: RpcServiceCallerInterface + ?Sized>(
        caller: &C,
        input: Self::Input,
    ) -> Result<Self::Output, RpcCallerError>;
}

/// Blanket implementation for every `RpcMethodDefinition`, so a definition
/// type never needs a manual implementation.
#[async_trait::async_trait]
impl<T> RpcCallTyped for T
where
    T: RpcMethodDefinition + Send + Sync + 'static,
    T::Input: Send + 'static,
    T::Output: Send + 'static,
{
    async fn call<C: RpcServiceCallerInterface + ?Sized>(
        caller: &C,
        input: Self::Input,
    ) -> Result<Self::Output, RpcCallerError> {
        let args = Self::encode_args(input)?;
        let return_value = caller
            .send_request(Self::HOST_NAME, Self::METHOD_NAME, args)?
            .await?;

        Ok(Self::decode_return(return_value)?)
    }
}
