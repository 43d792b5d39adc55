use std::{
    any::type_name,
    ops::{Deref, DerefMut},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Number, Value, value::RawValue};

use crate::{FloatKind, IntKind, ParameterError, Shape, utils::short_type_name};


/// A value that can be decoded from one positional JSON parameter.
pub trait Param: Sized + Send + 'static {
    fn shape() -> Shape;
    fn decode(raw: &RawValue) -> Option<Self>;
}

/// A parameter or result decoded structurally from a JSON object.
///
/// Scalar parameters go through the coercion policy in [`decode_params`];
/// `Object<T>` parameters are handed to `T`'s `Deserialize` implementation as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object<T>(pub T);

impl<T> Object<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}
impl<T> Deref for Object<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}
impl<T> DerefMut for Object<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
impl<T> From<T> for Object<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Param for Object<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn shape() -> Shape {
        Shape::Object(short_type_name(type_name::<T>()))
    }
    fn decode(raw: &RawValue) -> Option<Self> {
        serde_json::from_str(raw.get()).ok().map(Self)
    }
}

fn generic(raw: &RawValue) -> Option<Value> {
    serde_json::from_str(raw.get()).ok()
}
fn number(raw: &RawValue) -> Option<Number> {
    match generic(raw)? {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

/// Converts a floating-point JSON number into an integer.
///
/// Only finite values without a fractional part are accepted; truncation never
/// silently drops digits.
fn coerce_float(value: f64) -> Option<i128> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    if value < i128::MIN as f64 || value >= i128::MAX as f64 {
        return None;
    }
    Some(value as i128)
}

impl Param for bool {
    fn shape() -> Shape {
        Shape::Bool
    }
    fn decode(raw: &RawValue) -> Option<Self> {
        generic(raw)?.as_bool()
    }
}

impl Param for String {
    fn shape() -> Shape {
        Shape::String
    }
    fn decode(raw: &RawValue) -> Option<Self> {
        match generic(raw)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Param for f64 {
    fn shape() -> Shape {
        Shape::Float(FloatKind::F64)
    }
    fn decode(raw: &RawValue) -> Option<Self> {
        number(raw)?.as_f64()
    }
}

impl Param for f32 {
    fn shape() -> Shape {
        Shape::Float(FloatKind::F32)
    }
    fn decode(raw: &RawValue) -> Option<Self> {
        let value = number(raw)?.as_f64()?;
        let narrowed = value as f32;
        narrowed.is_finite().then_some(narrowed)
    }
}

macro_rules! impl_int_param {
    ($($ty:ident => $kind:ident),* $(,)?) => {$(
        impl Param for $ty {
            fn shape() -> Shape {
                Shape::Int(IntKind::$kind)
            }
            fn decode(raw: &RawValue) -> Option<Self> {
                let n = number(raw)?;
                if let Some(value) = n.as_i64() {
                    return Self::try_from(value).ok();
                }
                if let Some(value) = n.as_u64() {
                    return Self::try_from(value).ok();
                }
                Self::try_from(coerce_float(n.as_f64()?)?).ok()
            }
        }
    )*};
}
impl_int_param!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
);

/// An ordered parameter list, implemented for tuples of [`Param`].
pub trait Params: Sized + Send + 'static {
    const ARITY: usize;
    fn shapes() -> Vec<Shape>;
    fn decode_each(raw: &[&RawValue]) -> Result<Self, ParameterError>;
}

fn decode_at<P: Param>(raw: &[&RawValue], index: usize) -> Result<P, ParameterError> {
    raw.get(index)
        .and_then(|raw| P::decode(raw))
        .ok_or(ParameterError::TypeMismatch(index + 1))
}

macro_rules! impl_params {
    ($($p:ident $index:tt),*) => {
        impl<$($p: Param),*> Params for ($($p,)*) {
            const ARITY: usize = <[usize]>::len(&[$($index),*]);
            fn shapes() -> Vec<Shape> {
                vec![$($p::shape()),*]
            }
            #[allow(unused_variables)]
            fn decode_each(raw: &[&RawValue]) -> Result<Self, ParameterError> {
                Ok(($(decode_at::<$p>(raw, $index)?,)*))
            }
        }
    };
}
impl_params!();
impl_params!(P0 0);
impl_params!(P0 0, P1 1);
impl_params!(P0 0, P1 1, P2 2);
impl_params!(P0 0, P1 1, P2 2, P3 3);
impl_params!(P0 0, P1 1, P2 2, P3 3, P4 4);
impl_params!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5);
impl_params!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6);
impl_params!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7);

/// Decodes positional JSON parameters into the argument list `A`.
///
/// Fails with [`ParameterError::Arity`] when the lengths differ, and with
/// [`ParameterError::TypeMismatch`] carrying the 1-based position of the first
/// parameter that does not fit its shape.
pub fn decode_params<A: Params>(raw: &[&RawValue]) -> Result<A, ParameterError> {
    if raw.len() != A::ARITY {
        return Err(ParameterError::Arity {
            expected: A::ARITY,
            actual: raw.len(),
        });
    }
    A::decode_each(raw)
}
