use core::fmt::Write;

use heapless::String;

use super::{PAGE_COUNT, Screen};
use crate::metrics::Metric;

/// Text buffer for a formatted value. Wide enough for any `f32` at the
/// precisions in use.
pub type FrameText = String<48>;

/// Metrics shown on each content page, top row first.
const PAGE_LAYOUT: [[Option<Metric>; 2]; PAGE_COUNT as usize] = [
    [Some(Metric::Temperature), Some(Metric::Humidity)],
    [Some(Metric::Co2), Some(Metric::Voc)],
    [Some(Metric::Pressure), None],
    [Some(Metric::Voltage), Some(Metric::ChargeLevel)],
];

/// Most recent single reading of each metric, as opposed to the uplink
/// averages.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveValues {
    values: [Option<f32>; Metric::COUNT],
}

impl LiveValues {
    pub const fn new() -> Self {
        Self {
            values: [None; Metric::COUNT],
        }
    }

    pub fn set(&mut self, metric: Metric, value: f32) {
        self.values[metric.index()] = Some(value);
    }

    pub fn get(&self, metric: Metric) -> Option<f32> {
        self.values[metric.index()]
    }
}

/// One label/value/unit line on a content page.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: &'static str,
    pub value: FrameText,
    pub unit: &'static str,
}

impl Row {
    fn new(metric: Metric, value: Option<f32>) -> Self {
        Self {
            label: metric.page_label(),
            value: format_value(value, metric.precision()),
            unit: metric.unit(),
        }
    }
}

/// Everything the display collaborator needs to draw one screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Page {
        index: u8,
        rows: [Option<Row>; 2],
        /// "N/total" page indicator
        footer: String<8>,
    },
    Menu {
        item: u8,
        footer: String<8>,
    },
}

impl Frame {
    pub(crate) fn build(screen: Screen, menu_item: u8, live: &LiveValues) -> Self {
        match screen {
            Screen::Page(index) => {
                let layout = PAGE_LAYOUT[index.min(PAGE_COUNT - 1) as usize];
                Frame::Page {
                    index,
                    rows: layout.map(|slot| slot.map(|m| Row::new(m, live.get(m)))),
                    footer: footer(index as u16 + 1),
                }
            }
            // The menu has no page number of its own; the indicator reads 0.
            Screen::Menu => Frame::Menu {
                item: menu_item,
                footer: footer(0),
            },
        }
    }

    pub fn footer(&self) -> &str {
        match self {
            Frame::Page { footer, .. } | Frame::Menu { footer, .. } => footer.as_str(),
        }
    }
}

fn footer(position: u16) -> String<8> {
    let mut text = String::new();
    let _ = write!(text, "{}/{}", position, PAGE_COUNT);
    text
}

/// Fixed-precision rendering, `-` when the value was never read.
pub(crate) fn format_value(value: Option<f32>, precision: usize) -> FrameText {
    let mut text = FrameText::new();
    if let Some(v) = value {
        if write!(text, "{:.*}", precision, v).is_ok() {
            return text;
        }
        text.clear();
    }
    let _ = text.push('-');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(21.44), 1).as_str(), "21.4");
        assert_eq!(format_value(Some(3.3), 2).as_str(), "3.30");
        assert_eq!(format_value(Some(1013.4), 0).as_str(), "1013");
        assert_eq!(format_value(None, 0).as_str(), "-");
        assert!(format_value(Some(f32::MAX), 2).len() > 30);
    }

    #[test]
    fn test_page_frame_uses_live_values() {
        let mut live = LiveValues::default();
        live.set(Metric::Temperature, 22.56);

        let frame = Frame::build(Screen::Page(0), 0, &live);
        let Frame::Page { rows, footer, .. } = frame else {
            panic!("expected a content page");
        };
        let top = rows[0].as_ref().unwrap();
        assert_eq!(top.label, "Temperature");
        assert_eq!(top.value.as_str(), "22.6");
        assert_eq!(top.unit, " \u{b0}C");
        assert_eq!(rows[1].as_ref().unwrap().value.as_str(), "-");
        assert_eq!(footer.as_str(), "1/4");
    }

    #[test]
    fn test_pressure_page_has_single_row() {
        let frame = Frame::build(Screen::Page(2), 0, &LiveValues::default());
        let Frame::Page { rows, .. } = &frame else {
            panic!("expected a content page");
        };
        assert_eq!(rows[0].as_ref().unwrap().label, "Air pressure");
        assert!(rows[1].is_none());
        assert_eq!(frame.footer(), "3/4");
    }

    #[test]
    fn test_menu_frame() {
        let frame = Frame::build(Screen::Menu, 3, &LiveValues::default());
        assert!(matches!(frame, Frame::Menu { item: 3, .. }));
        assert_eq!(frame.footer(), "0/4");
    }
}
