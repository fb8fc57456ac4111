//! Host-specific collectors. Exactly one is compiled in; the rest of the
//! crate only sees [`NativeCollector`] through the `MetricsSource` trait.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod unsupported;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use unsupported as platform_impl;

pub type NativeCollector = platform_impl::Collector;

pub const PLATFORM_NAME: &str = platform_impl::NAME;

pub fn native_collector() -> NativeCollector {
    platform_impl::collector()
}
