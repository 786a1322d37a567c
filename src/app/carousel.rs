//! Auto-advancing highlight rail that loops without scrolling backwards.
//!
//! The rail holds N items followed by a clone of the first one. Advancing onto
//! the clone scrolls there smoothly; once that scroll settles the rail jumps
//! back to slot 0 without animation, which looks like a seamless wrap.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScrollCommand {
    Smooth(usize),
    Instant(usize),
}

impl ScrollCommand {
    pub(crate) fn slot(self) -> usize {
        match self {
            Self::Smooth(slot) | Self::Instant(slot) => slot,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Carousel {
    len: usize,
    index: usize,
    in_flight: Option<ScrollCommand>,
}

impl Carousel {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    /// Restarts at slot 0 when the number of items changes.
    pub(crate) fn set_len(&mut self, len: usize) {
        if self.len != len {
            *self = Self::new(len);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn slot_count(&self) -> usize {
        if self.loops() { self.len + 1 } else { self.len }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Item shown in the current slot; the trailing clone maps to item 0.
    pub(crate) fn active_item(&self) -> Option<usize> {
        (self.len > 0).then(|| self.index % self.len)
    }

    pub(crate) fn is_scrolling(&self) -> bool {
        self.in_flight.is_some()
    }

    fn loops(&self) -> bool {
        self.len > 1
    }

    /// Timer callback. Skipped while a programmatic scroll is still running.
    pub(crate) fn tick(&mut self) -> Option<ScrollCommand> {
        if !self.loops() || self.in_flight.is_some() {
            return None;
        }
        self.index = (self.index + 1).min(self.len);
        let command = ScrollCommand::Smooth(self.index);
        self.in_flight = Some(command);
        Some(command)
    }

    /// The host reports that the last issued scroll finished.
    ///
    /// Landing on the clone answers with an instant jump back to slot 0, which the
    /// host must also settle.
    pub(crate) fn on_scroll_settled(&mut self) -> Option<ScrollCommand> {
        match self.in_flight.take()? {
            ScrollCommand::Smooth(slot) if slot == self.len => {
                self.index = 0;
                let reset = ScrollCommand::Instant(0);
                self.in_flight = Some(reset);
                Some(reset)
            }
            ScrollCommand::Smooth(_) | ScrollCommand::Instant(_) => None,
        }
    }

    /// Slot one step away from the current one, wrapping at both ends.
    /// Moving forward from the last item lands on the clone.
    pub(crate) fn neighbor_slot(&self, forward: bool) -> Option<usize> {
        if !self.loops() {
            return None;
        }
        let item = self.index % self.len;
        Some(match (forward, item) {
            (true, item) => item + 1,
            (false, 0) => self.len - 1,
            (false, item) => item - 1,
        })
    }

    /// A scroll position reported by the host. Ignored while a programmatic
    /// scroll is in flight; otherwise snaps to the nearest slot.
    pub(crate) fn on_user_scroll(&mut self, offset: f32, slot_width: f32) -> Option<ScrollCommand> {
        if self.in_flight.is_some() || self.len == 0 || slot_width <= 0.0 {
            return None;
        }
        let last = self.slot_count().saturating_sub(1);
        let nearest = (offset / slot_width).round().clamp(0.0, last as f32) as usize;
        if self.loops() && nearest == self.len {
            self.index = 0;
            let reset = ScrollCommand::Instant(0);
            self.in_flight = Some(reset);
            return Some(reset);
        }
        self.index = nearest;
        None
    }
}
