//! Element trait and type tag mapping for buffered transfer.
//!
//! This module provides the [`Element`] trait, a sealed trait over the plain
//! numeric types that can travel through buffered send/receive. Every buffered
//! message carries an [`ElementTag`] so the receiver can reject a buffer of the
//! wrong type at runtime.
//!
//! # Supported Types
//!
//! | Rust Type | Tag              |
//! |-----------|------------------|
//! | `f32`     | `ElementTag::F32`|
//! | `f64`     | `ElementTag::F64`|
//! | `i32`     | `ElementTag::I32`|
//! | `i64`     | `ElementTag::I64`|
//! | `u8`      | `ElementTag::U8` |
//! | `u32`     | `ElementTag::U32`|
//! | `u64`     | `ElementTag::U64`|

/// Internal module to seal the trait — prevents external implementations.
mod sealed {
    pub trait Sealed {}
}

/// Runtime tag identifying the element type of a buffered message.
///
/// Carried on every buffered envelope and checked against the receive buffer's
/// element type before any bytes are copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementTag {
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 8-bit unsigned integer
    U8,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit unsigned integer
    U64,
}

/// Trait for types that can be used in buffered communication operations.
///
/// This is a **sealed trait** — it cannot be implemented outside this crate.
/// Supported types: [`f32`], [`f64`], [`i32`], [`i64`], [`u8`], [`u32`], [`u64`].
///
/// # Example
///
/// ```
/// use rally::{Cluster, Result};
///
/// # fn main() -> Result<()> {
/// let outputs = Cluster::new(2)?.run(|comm| {
///     // Works with f64
///     if comm.rank() == 0 {
///         comm.send(&[1.0f64, 2.0], 1, 0)?;
///     } else {
///         let mut buf = [0.0f64; 2];
///         comm.recv(&mut buf, 0, 0)?;
///     }
///     Ok(())
/// })?;
/// assert_eq!(outputs.len(), 2);
/// # Ok(())
/// # }
/// ```
pub trait Element: sealed::Sealed + bytemuck::Pod + Send + 'static {
    /// The tag carried on buffered envelopes for runtime type checking.
    const TAG: ElementTag;
}

macro_rules! impl_element {
    ($ty:ty, $tag:expr) => {
        impl sealed::Sealed for $ty {}
        impl Element for $ty {
            const TAG: ElementTag = $tag;
        }
    };
}

impl_element!(f32, ElementTag::F32);
impl_element!(f64, ElementTag::F64);
impl_element!(i32, ElementTag::I32);
impl_element!(i64, ElementTag::I64);
impl_element!(u8, ElementTag::U8);
impl_element!(u32, ElementTag::U32);
impl_element!(u64, ElementTag::U64);
