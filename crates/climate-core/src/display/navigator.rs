use log::debug;

use super::{Frame, LiveValues, MENU_ITEMS, PAGE_COUNT};
use crate::metrics::Metric;

/// Debounced input events from the LCD module buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Left click
    Previous,
    /// Right click
    Next,
    /// Left hold
    SecondaryHold,
    /// Right hold
    TertiaryHold,
    /// Both buttons held
    QuaternaryHold,
}

/// What the node should do in response to a button event.
///
/// The navigator only owns page state; anything touching LEDs, the
/// scheduler or the calibration session is carried out by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    /// Navigation state may have changed; redraw the screen
    Redraw,
    /// Light the activity indicator and redraw right away
    Activity,
    /// Start or stop the CO2 calibration session
    ToggleCalibration,
    /// Pulse the attention indicator once
    PulseIndicator,
}

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Content page `0..PAGE_COUNT`
    Page(u8),
    Menu,
}

/// Page/menu cursor plus the live values the pages display.
#[derive(Debug, Clone)]
pub struct DisplayNavigator {
    screen: Screen,
    menu_item: u8,
    live: LiveValues,
}

impl Default for DisplayNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayNavigator {
    pub const fn new() -> Self {
        Self {
            screen: Screen::Page(0),
            menu_item: 0,
            live: LiveValues::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn menu_item(&self) -> u8 {
        self.menu_item
    }

    pub fn live(&self) -> &LiveValues {
        &self.live
    }

    /// Record the latest single reading of `metric`.
    pub fn set_live(&mut self, metric: Metric, value: f32) {
        self.live.set(metric, value);
    }

    pub fn handle_button(&mut self, event: ButtonEvent) -> NavEffect {
        match event {
            ButtonEvent::Previous => {
                self.previous();
                NavEffect::Redraw
            }
            ButtonEvent::Next => {
                self.next();
                NavEffect::Redraw
            }
            ButtonEvent::SecondaryHold => NavEffect::Activity,
            ButtonEvent::TertiaryHold => NavEffect::ToggleCalibration,
            ButtonEvent::QuaternaryHold => NavEffect::PulseIndicator,
        }
    }

    /// Step back one page, or move the menu cursor down when in the menu.
    pub fn previous(&mut self) {
        match self.screen {
            Screen::Page(0) => {
                self.screen = Screen::Page(PAGE_COUNT - 1);
                self.menu_item = 0;
            }
            Screen::Page(index) => self.screen = Screen::Page(index - 1),
            Screen::Menu => self.menu_item = (self.menu_item + 1) % MENU_ITEMS,
        }
        debug!("Display: {:?} item {}", self.screen, self.menu_item);
    }

    /// Step forward one page; past the last page lies the menu.
    ///
    /// In the menu this only leaves to the first page while the cursor is on
    /// item 0; on any other item the input is ignored.
    pub fn next(&mut self) {
        match self.screen {
            Screen::Page(index) if index + 1 >= PAGE_COUNT => {
                self.screen = Screen::Menu;
                self.menu_item = 0;
            }
            Screen::Page(index) => self.screen = Screen::Page(index + 1),
            Screen::Menu if self.menu_item == 0 => self.screen = Screen::Page(0),
            Screen::Menu => {}
        }
        debug!("Display: {:?} item {}", self.screen, self.menu_item);
    }

    /// Frame for the current screen.
    pub fn frame(&self) -> Frame {
        Frame::build(self.screen, self.menu_item, &self.live)
    }
}
