//! Numeric and ordering terminals.

use crate::terminal::settle;
use crate::{Stream, StreamError};
use core::iter::Sum;

/// Lossy widening to `f64`, used by [`Stream::average`].
pub trait ToF64: Copy {
    /// Converts to `f64`, rounding when the value does not fit exactly.
    fn to_f64(self) -> f64;
}

macro_rules! impl_to_f64 {
    ($($t:ty),*) => {
        $(
            impl ToF64 for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_to_f64!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<I> Stream<I>
where
    I: Iterator,
    I::Item: Ord,
{
    /// Largest item; empty streams are an error.
    pub fn max(self) -> Result<I::Item, StreamError> {
        self.reduce(|a, b| if b > a { b } else { a })
            .map_err(|e| if e.is_empty() { StreamError::Empty("max") } else { e })
    }

    /// Smallest item; empty streams are an error.
    pub fn min(self) -> Result<I::Item, StreamError> {
        self.reduce(|a, b| if b < a { b } else { a })
            .map_err(|e| if e.is_empty() { StreamError::Empty("min") } else { e })
    }
}

impl<I> Stream<I>
where
    I: Iterator,
{
    /// Sum of all items. The sum of an empty stream is the additive identity.
    pub fn sum<T>(self) -> Result<T, StreamError>
    where
        T: Sum<I::Item>,
    {
        let poison = self.poison.clone();
        let total: T = Iterator::sum(self);
        settle(&poison, total)
    }

    /// Arithmetic mean; empty streams are an error.
    pub fn average(self) -> Result<f64, StreamError>
    where
        I::Item: ToF64,
    {
        let (sum, count) = self.fold((0.0f64, 0usize), |(sum, count), v| {
            (sum + v.to_f64(), count + 1)
        })?;
        if count == 0 {
            return Err(StreamError::Empty("average"));
        }
        Ok(sum / count as f64)
    }
}
