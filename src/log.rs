// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Logging macros.
//!
//! With the `defmt` feature these forward to the matching `defmt` macro (RTT on the board). Without
//! it the arguments are still evaluated by reference, so call sites keep compiling, but nothing is
//! emitted. The USART is the protocol link, so log output never goes over it.
//!
//! The macros are exported so the firmware binary logs through the same shim.
//!
//! Only plain `{}` / `{:?}` placeholders are used so the same call sites are valid for both.

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! trace {
    ($($t:tt)*) => { defmt::trace!($($t)*) };
}

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! debug {
    ($($t:tt)*) => { defmt::debug!($($t)*) };
}

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! info {
    ($($t:tt)*) => { defmt::info!($($t)*) };
}

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! warn {
    ($($t:tt)*) => { defmt::warn!($($t)*) };
}

#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! error {
    ($($t:tt)*) => { defmt::error!($($t)*) };
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! trace {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        let _ = ($(&$arg,)*);
    }};
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        let _ = ($(&$arg,)*);
    }};
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        let _ = ($(&$arg,)*);
    }};
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        let _ = ($(&$arg,)*);
    }};
}

#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! error {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        let _ = ($(&$arg,)*);
    }};
}
