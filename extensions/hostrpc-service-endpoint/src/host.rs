use crate::error::RpcHostError;
use futures::FutureExt;
use futures::future::BoxFuture;
use hostrpc::rpc::RpcValue;
use hostrpc_service::RpcMethodDefinition;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

pub type RpcHostResult = Result<RpcValue, RpcHostError>;

/// The normalized outcome of invoking a host method.
pub type RpcHostFuture = BoxFuture<'static, RpcHostResult>;

/// A single callable member of a host, taking positional arguments.
pub type RpcHostMethod = Arc<dyn Fn(Vec<RpcValue>) -> RpcHostFuture + Send + Sync>;

/// An object whose methods can be invoked by name from a remote caller.
///
/// Resolution is purely by name at call time. Returning `None` means the
/// host has no such method; the endpoint reports that as `UnknownMethod`.
///
/// Synchronous methods can return an already-completed future
/// (`futures::future::ready(..).boxed()`); asynchronous ones return their
/// future as-is. Callers cannot tell the difference.
pub trait RpcHost: Send + Sync {
    fn invoke(&self, method_name: &str, args: Vec<RpcValue>) -> Option<RpcHostFuture>;

    /// Names of the methods this host exposes, for diagnostics.
    fn method_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Host names that typed method definitions attached to this host expect
    /// to be registered under. Empty when nothing is declared.
    fn declared_host_names(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

impl<H: RpcHost + ?Sized> RpcHost for Arc<H> {
    fn invoke(&self, method_name: &str, args: Vec<RpcValue>) -> Option<RpcHostFuture> {
        (**self).invoke(method_name, args)
    }

    fn method_names(&self) -> Vec<String> {
        (**self).method_names()
    }

    fn declared_host_names(&self) -> Vec<&'static str> {
        (**self).declared_host_names()
    }
}

/// A host assembled from closures, one per method.
///
/// ```rust
/// use hostrpc::rpc::{RpcValue, take_arg};
/// use hostrpc_service_endpoint::{RpcHost, RpcHostObject};
///
/// let calc = RpcHostObject::new().with_method("add", |args| {
///     let mut args = args.into_iter();
///     let a: i64 = take_arg(&mut args, 0)?;
///     let b: i64 = take_arg(&mut args, 1)?;
///     Ok(a + b)
/// });
///
/// assert!(calc.invoke("add", vec![RpcValue::Int(2), RpcValue::Int(3)]).is_some());
/// assert!(calc.invoke("sub", vec![]).is_none());
/// ```
#[derive(Clone, Default)]
pub struct RpcHostObject {
    methods: HashMap<String, RpcHostMethod>,
    declared_host_names: Vec<&'static str>,
}

impl RpcHostObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a synchronous method. Its result is delivered as an
    /// already-completed future.
    pub fn with_method<F, R>(mut self, method_name: impl Into<String>, method: F) -> Self
    where
        F: Fn(Vec<RpcValue>) -> Result<R, RpcHostError> + Send + Sync + 'static,
        R: Into<RpcValue>,
    {
        let method = Arc::new(method);
        let wrapped = move |args: Vec<RpcValue>| {
            let method = Arc::clone(&method);
            // Run lazily so a panic surfaces from the future, like an async method's would.
            async move { method(args).map(Into::into) }.boxed()
        };
        self.methods.insert(method_name.into(), Arc::new(wrapped));
        self
    }

    /// Adds an asynchronous method. The returned future is passed through
    /// unchanged.
    pub fn with_async_method<F, Fut, R>(mut self, method_name: impl Into<String>, method: F) -> Self
    where
        F: Fn(Vec<RpcValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RpcHostError>> + Send + 'static,
        R: Into<RpcValue>,
    {
        let wrapped = move |args: Vec<RpcValue>| {
            let fut = method(args);
            async move { fut.await.map(Into::into) }.boxed()
        };
        self.methods.insert(method_name.into(), Arc::new(wrapped));
        self
    }

    /// Adds the method described by `M`, decoding its arguments and encoding
    /// its return value through the definition.
    ///
    /// Argument or return conversion failures are reported as
    /// `SerializationError`.
    ///
    /// Typed callers address `M::HOST_NAME`, so the object must be registered
    /// under that name to be reachable. The name is recorded in
    /// `declared_host_names` and the registry warns on a mismatch.
    pub fn with_typed_method<M, F, Fut>(mut self, method: F) -> Self
    where
        M: RpcMethodDefinition + 'static,
        M::Input: Send + 'static,
        M::Output: Send + 'static,
        F: Fn(M::Input) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<M::Output, RpcHostError>> + Send + 'static,
    {
        if !self.declared_host_names.contains(&M::HOST_NAME) {
            self.declared_host_names.push(M::HOST_NAME);
        }

        let method = Arc::new(method);
        self.with_async_method(M::METHOD_NAME, move |args| {
            let method = Arc::clone(&method);
            async move {
                let input = M::decode_args(args)?;
                let output = method(input).await?;
                Ok::<_, RpcHostError>(M::encode_return(output)?)
            }
        })
    }

    pub fn has_method(&self, method_name: &str) -> bool {
        self.methods.contains_key(method_name)
    }
}

impl RpcHost for RpcHostObject {
    fn invoke(&self, method_name: &str, args: Vec<RpcValue>) -> Option<RpcHostFuture> {
        self.methods.get(method_name).map(|method| method(args))
    }

    fn method_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }

    fn declared_host_names(&self) -> Vec<&'static str> {
        self.declared_host_names.clone()
    }
}
