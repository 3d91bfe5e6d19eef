use std::cell::Cell;
use std::rc::Rc;

use ratatui::layout::{Position, Rect};

use crate::listeners::{Listeners, Subscription};

/// A pointer click anywhere in the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub column: u16,
    pub row: u16,
}

/// An open facet panel. While it lives, clicks outside its area mark it
/// closed; dropping it releases the click listener.
pub struct PanelScope {
    facet: String,
    area: Rc<Cell<Rect>>,
    closed: Rc<Cell<bool>>,
    _subscription: Subscription,
}

impl PanelScope {
    pub fn open(clicks: &Listeners<Click>, facet: &str, area: Rect) -> Self {
        let area = Rc::new(Cell::new(area));
        let closed = Rc::new(Cell::new(false));
        let watched = Rc::clone(&area);
        let flag = Rc::clone(&closed);
        let subscription = clicks.subscribe(move |click: &Click| {
            if !watched.get().contains(Position::new(click.column, click.row)) {
                flag.set(true);
            }
        });
        tracing::trace!(facet, "facet panel opened");
        Self {
            facet: facet.to_string(),
            area,
            closed,
            _subscription: subscription,
        }
    }

    pub fn facet(&self) -> &str {
        &self.facet
    }

    /// The panel moves with the layout; keep the hit area in sync.
    pub fn set_area(&self, area: Rect) {
        self.area.set(area);
    }

    pub fn area(&self) -> Rect {
        self.area.get()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_click_closes_and_drop_releases_listener() {
        let clicks = Listeners::new();
        let scope = PanelScope::open(&clicks, "area_type", Rect::new(0, 0, 20, 10));
        assert_eq!(clicks.len(), 1);

        clicks.emit(&Click { column: 5, row: 5 });
        assert!(!scope.is_closed());

        scope.set_area(Rect::new(30, 0, 20, 10));
        clicks.emit(&Click { column: 5, row: 5 });
        assert!(scope.is_closed());

        drop(scope);
        assert!(clicks.is_empty());
    }

    #[test]
    fn reopening_does_not_accumulate_listeners() {
        let clicks = Listeners::new();
        for _ in 0..3 {
            let scope = PanelScope::open(&clicks, "measure_type", Rect::new(0, 0, 10, 10));
            assert_eq!(scope.facet(), "measure_type");
        }
        assert!(clicks.is_empty());
    }
}
