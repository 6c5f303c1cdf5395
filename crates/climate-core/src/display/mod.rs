//! LCD page navigation and the frame model handed to the display collaborator.

pub mod frame;
pub mod navigator;

pub use frame::{Frame, FrameText, LiveValues, Row};
pub use navigator::{ButtonEvent, DisplayNavigator, NavEffect, Screen};

/// Number of content pages.
pub const PAGE_COUNT: u8 = 4;

/// Number of entries in the menu.
pub const MENU_ITEMS: u8 = 5;
