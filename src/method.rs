use std::{
    any::type_name,
    fmt,
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use serde::Serialize;
use serde_json::{Value, value::RawValue};

use crate::{DispatchError, Params, Result, Shape, decode_params};

/// The error-reporting capability required of a method's error value.
///
/// Every [`Display`](fmt::Display) type qualifies.
pub trait Describe {
    fn describe(&self) -> String;
}
impl<T: fmt::Display + ?Sized> Describe for T {
    fn describe(&self) -> String {
        self.to_string()
    }
}

/// A function callable as a method of the receiver `S` with parameters `A`.
///
/// Implemented for every `Fn(&S, P0, .., Pn) -> Result<R, E>` with up to eight
/// [`Param`](crate::Param) arguments, so inherent methods such as
/// `Arith::add` can be registered directly.
pub trait MethodFn<S, A>: Send + Sync + 'static {
    type Output: Serialize;
    type Error: Describe;
    fn call(&self, receiver: &S, args: A) -> Result<Self::Output, Self::Error>;
}

macro_rules! impl_method_fn {
    ($($p:ident),*) => {
        impl<S, F, R, E, $($p),*> MethodFn<S, ($($p,)*)> for F
        where
            F: Fn(&S, $($p),*) -> Result<R, E> + Send + Sync + 'static,
            R: Serialize,
            E: Describe,
        {
            type Output = R;
            type Error = E;
            #[allow(non_snake_case)]
            fn call(&self, receiver: &S, ($($p,)*): ($($p,)*)) -> Result<R, E> {
                self(receiver, $($p),*)
            }
        }
    };
}
impl_method_fn!();
impl_method_fn!(P0);
impl_method_fn!(P0, P1);
impl_method_fn!(P0, P1, P2);
impl_method_fn!(P0, P1, P2, P3);
impl_method_fn!(P0, P1, P2, P3, P4);
impl_method_fn!(P0, P1, P2, P3, P4, P5);
impl_method_fn!(P0, P1, P2, P3, P4, P5, P6);
impl_method_fn!(P0, P1, P2, P3, P4, P5, P6, P7);

trait Invoke: Send + Sync {
    fn invoke(&self, params: &[&RawValue], calls: &AtomicU64) -> Result<Value>;
}

struct Bound<S, A, F> {
    receiver: Arc<S>,
    f: F,
    _args: PhantomData<fn(A)>,
}
impl<S, A, F> Invoke for Bound<S, A, F>
where
    S: Send + Sync + 'static,
    A: Params,
    F: MethodFn<S, A>,
{
    fn invoke(&self, params: &[&RawValue], calls: &AtomicU64) -> Result<Value> {
        let args = decode_params::<A>(params)?;
        calls.fetch_add(1, Ordering::Relaxed);
        match self.f.call(&self.receiver, args) {
            Ok(value) => serde_json::to_value(value)
                .map_err(|e| DispatchError::ResultSerialize(Arc::new(e))),
            Err(e) => Err(DispatchError::Application(e.describe())),
        }
    }
}

/// Metadata and invoker for one remotely callable method.
pub struct MethodDescriptor {
    name: String,
    param_shapes: Vec<Shape>,
    result_type: &'static str,
    calls: AtomicU64,
    invoker: Box<dyn Invoke>,
}

impl MethodDescriptor {
    pub(crate) fn new<S, A, F>(name: String, receiver: Arc<S>, f: F) -> Self
    where
        S: Send + Sync + 'static,
        A: Params,
        F: MethodFn<S, A>,
    {
        Self {
            name,
            param_shapes: A::shapes(),
            result_type: type_name::<F::Output>(),
            calls: AtomicU64::new(0),
            invoker: Box::new(Bound {
                receiver,
                f,
                _args: PhantomData,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    /// Shapes of the parameters, excluding the receiver.
    pub fn param_shapes(&self) -> &[Shape] {
        &self.param_shapes
    }
    pub fn arity(&self) -> usize {
        self.param_shapes.len()
    }
    pub fn result_type(&self) -> &'static str {
        self.result_type
    }
    /// Number of requests that passed routing and parameter decoding.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Decodes `params`, counts the call, and invokes the method.
    ///
    /// The counter is not touched when decoding fails.
    pub(crate) fn call(&self, params: &[&RawValue]) -> Result<Value> {
        self.invoker.invoke(params, &self.calls)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("param_shapes", &self.param_shapes)
            .field("result_type", &self.result_type)
            .field("call_count", &self.call_count())
            .finish()
    }
}
