//! Animated single-page portfolio.
//!
//! State and math (`theme`, `motion`, `overlay`, `content`, `scene`) build on
//! every target. Browser bindings and the Yew app only build for wasm32.

pub mod content;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod frontend;
pub mod motion;
pub mod overlay;
pub mod scene;
pub mod theme;
