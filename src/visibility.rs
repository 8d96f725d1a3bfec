/// Edge detector for the sentinel: reports only changes of its on-screen state
///
/// The feed never looks at geometry itself; whoever knows the viewport calls
/// [`VisibilitySignal::observe`] and forwards the transitions it returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisibilitySignal {
    visible: bool,
}

impl VisibilitySignal {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Record the current state; `Some` only when it differs from the last one
    pub fn observe(&mut self, visible: bool) -> Option<bool> {
        if visible == self.visible {
            None
        } else {
            self.visible = visible;
            Some(visible)
        }
    }
}
