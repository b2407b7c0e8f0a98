use std::fmt;

/// Virtual (JS-driven) scrollbar used in smooth-scrolling mode in place of
/// native scrolling.
pub trait VirtualScrollbar: fmt::Debug {
    /// Current (x, y) scroll offset.
    fn offset(&self) -> (f64, f64);
    fn set_position(&mut self, x: f64, y: f64);
    /// Detach listeners and restore native scrolling.
    fn destroy(&mut self);

    fn offset_along(&self, vertical: bool) -> f64 {
        let (x, y) = self.offset();
        if vertical {
            y
        } else {
            x
        }
    }

    fn set_position_along(&mut self, vertical: bool, pos: f64) {
        let (x, y) = self.offset();
        if vertical {
            self.set_position(x, pos);
        } else {
            self.set_position(pos, y);
        }
    }
}
