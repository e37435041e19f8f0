//! Tree builder: applies a stream of events to a [`Section`].
//!
//! Opening a section moves it out of its parent onto a frame stack; closing
//! it moves it back. A key that is opened again reopens the same section, so
//! repeated headers merge their content.

use std::io::BufRead;

use crate::error::{Error, Location};
use crate::events::{Event, EventReader};
use crate::section::Section;

struct Frame {
    /// Slot of this section inside its parent.
    slot: usize,
    section: Section,
}

pub(crate) struct SectionBuilder<'a> {
    root: &'a mut Section,
    stack: Vec<Frame>,
}

impl<'a> SectionBuilder<'a> {
    pub(crate) fn new(root: &'a mut Section) -> Self {
        Self {
            root,
            stack: Vec::new(),
        }
    }

    /// Number of sections currently open below the root.
    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top(&mut self) -> &mut Section {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.section,
            None => &mut *self.root,
        }
    }

    pub(crate) fn consume(&mut self, event: Event, location: Location) -> Result<(), Error> {
        tracing::trace!(?event, line = location.line(), depth = self.depth(), "zpl event");
        match event {
            Event::SectionStart { name } => {
                let (slot, section) = self.top().take_section(&name, location)?;
                self.stack.push(Frame { slot, section });
            }
            Event::Value { name, value } => {
                self.top().push_value_at(name, value, location)?;
            }
            Event::SectionEnd => {
                let frame = self.stack.pop().ok_or(Error::Usage {
                    msg: "section end without a matching section start",
                })?;
                self.top().restore_section(frame.slot, frame.section);
            }
        }
        Ok(())
    }
}

impl Drop for SectionBuilder<'_> {
    /// Sections still open (after an error) go back to their parents.
    fn drop(&mut self) {
        while let Some(frame) = self.stack.pop() {
            self.top().restore_section(frame.slot, frame.section);
        }
    }
}

/// Drain `reader` into `root`, stopping at the first error.
pub(crate) fn build<R: BufRead>(mut reader: EventReader<R>, root: &mut Section) -> Result<(), Error> {
    let mut builder = SectionBuilder::new(root);
    while let Some((event, location)) = reader.next_event()? {
        builder.consume(event, location)?;
    }
    Ok(())
}
