//! Event sequencer: turns matched lines into a flat stream of structural events.
//!
//! Responsibilities
//! - Track the depth of the previous structural line.
//! - Synthesize one `SectionEnd` per level whenever the depth decreases, and
//!   close every open section at end of input.
//! - Queue the events produced by one line so they can be pulled one at a time.
//!
//! Events come out in depth-first pre-order: a `SectionStart` precedes all
//! events of its children and its `SectionEnd` follows them.

use std::collections::VecDeque;
use std::io::BufRead;

use crate::error::{Error, Location};
use crate::matcher::{MatchedLine, match_line};
use crate::options::Options;
use crate::scanner::LineScanner;

/// A structural parse event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A bare key opened a section.
    SectionStart { name: String },
    /// A `key = value` line.
    Value { name: String, value: String },
    /// The innermost open section ended.
    SectionEnd,
}

/// The indentation state machine, independent of where lines come from.
#[derive(Debug, Default)]
pub(crate) struct Sequencer {
    previous_depth: usize,
    strict_nesting: bool,
    queue: VecDeque<(Event, Location)>,
}

impl Sequencer {
    pub(crate) fn new(strict_nesting: bool) -> Self {
        Self {
            previous_depth: 0,
            strict_nesting,
            queue: VecDeque::new(),
        }
    }

    /// Queue the events for one matched line.
    pub(crate) fn push_line(&mut self, line: MatchedLine, location: Location) -> Result<(), Error> {
        if self.strict_nesting && line.depth > self.previous_depth {
            return Err(Error::syntax(
                format!(
                    "`{}` is indented {} levels but its section is at level {}",
                    line.key, line.depth, self.previous_depth
                ),
                location,
            ));
        }
        while line.depth < self.previous_depth {
            self.queue.push_back((Event::SectionEnd, location));
            self.previous_depth -= 1;
        }
        match line.value {
            Some(value) => self.queue.push_back((
                Event::Value {
                    name: line.key,
                    value,
                },
                location,
            )),
            None => {
                self.queue
                    .push_back((Event::SectionStart { name: line.key }, location));
                self.previous_depth += 1;
            }
        }
        Ok(())
    }

    /// Close every section still open at end of input.
    pub(crate) fn finish(&mut self, location: Location) {
        while self.previous_depth > 0 {
            self.queue.push_back((Event::SectionEnd, location));
            self.previous_depth -= 1;
        }
    }

    pub(crate) fn pop(&mut self) -> Option<(Event, Location)> {
        self.queue.pop_front()
    }
}

/// Pull-based event source over a buffered reader.
///
/// Only the events of the current line are buffered, so documents of any size
/// decode in bounded memory (apart from the line itself).
///
/// ```rust
/// use serde_zpl::{Event, events};
///
/// let all: Result<Vec<Event>, _> = events("main\n    type = queue\n").collect();
/// assert_eq!(
///     all.unwrap(),
///     vec![
///         Event::SectionStart { name: "main".into() },
///         Event::Value { name: "type".into(), value: "queue".into() },
///         Event::SectionEnd,
///     ]
/// );
/// ```
pub struct EventReader<R: BufRead> {
    scanner: LineScanner<R>,
    sequencer: Sequencer,
    last_location: Location,
    finished: bool,
}

impl<R: BufRead> EventReader<R> {
    /// Create an event reader with default [`Options`].
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, &Options::default())
    }

    /// Create an event reader honouring the line-level settings of `options`.
    pub fn with_options(reader: R, options: &Options) -> Self {
        Self {
            scanner: LineScanner::new(reader, options.max_line_bytes),
            sequencer: Sequencer::new(options.strict_nesting),
            last_location: Location::UNKNOWN,
            finished: false,
        }
    }

    /// Line of the most recently returned event.
    pub fn location(&self) -> Location {
        self.last_location
    }

    /// Pull the next event together with the line it came from.
    pub fn next_event(&mut self) -> Result<Option<(Event, Location)>, Error> {
        loop {
            if let Some((event, location)) = self.sequencer.pop() {
                self.last_location = location;
                return Ok(Some((event, location)));
            }
            if self.finished {
                return Ok(None);
            }
            match self.scanner.next_line() {
                Ok(Some(line)) => {
                    let pushed = match_line(&line.text, line.location)
                        .and_then(|matched| self.sequencer.push_line(matched, line.location));
                    if let Err(err) = pushed {
                        self.finished = true;
                        return Err(err);
                    }
                }
                Ok(None) => {
                    self.finished = true;
                    self.sequencer.finish(self.scanner.location());
                }
                Err(err) => {
                    self.finished = true;
                    return Err(err);
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<Event, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event() {
            Ok(Some((event, _))) => Some(Ok(event)),
            Ok(None) => None,
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Stream the events of a ZPL document held in memory.
pub fn events(input: &str) -> EventReader<&[u8]> {
    EventReader::new(input.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(name: &str) -> Event {
        Event::SectionStart { name: name.into() }
    }

    fn value(name: &str, value: &str) -> Event {
        Event::Value {
            name: name.into(),
            value: value.into(),
        }
    }

    fn collect(input: &str) -> Vec<Event> {
        events(input).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn two_level_dedent_yields_two_ends() {
        let input = "a\n    b\n        c = 1\nd = 2\n";
        assert_eq!(
            collect(input),
            vec![
                start("a"),
                start("b"),
                value("c", "1"),
                Event::SectionEnd,
                Event::SectionEnd,
                value("d", "2"),
            ]
        );
    }

    #[test]
    fn open_sections_close_at_end_of_input() {
        assert_eq!(
            collect("a\n    b"),
            vec![start("a"), start("b"), Event::SectionEnd, Event::SectionEnd]
        );
    }

    #[test]
    fn deeper_jump_is_accepted_as_one_level() {
        // The value at depth 2 directly under a depth-0 section lands in that section.
        let input = "a\n        x = 1\n    y = 2\nz = 3\n";
        assert_eq!(
            collect(input),
            vec![
                start("a"),
                value("x", "1"),
                value("y", "2"),
                Event::SectionEnd,
                value("z", "3"),
            ]
        );
    }

    #[test]
    fn over_indented_top_level_value_is_accepted() {
        assert_eq!(collect("    key = overly indented value"), vec![value("key", "overly indented value")]);
    }

    #[test]
    fn strict_nesting_rejects_deeper_jump() {
        let options = crate::options! { strict_nesting: true };
        let mut reader = EventReader::with_options("a\n        x = 1\n".as_bytes(), &options);
        assert_eq!(reader.next().unwrap().unwrap(), start("a"));
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.location().map(|l| l.line()), Some(2));
        assert!(reader.next().is_none());
    }

    #[test]
    fn events_carry_line_numbers() {
        let mut reader = events("# c\na\n\n    b = 1\n");
        assert_eq!(reader.next_event().unwrap().unwrap().1.line(), 2);
        assert_eq!(reader.next_event().unwrap().unwrap().1.line(), 4);
        assert_eq!(reader.location().line(), 4);
    }

    #[test]
    fn syntax_error_stops_the_stream() {
        let mut reader = events("a = 1\ninvalid line with spaces\nb = 2\n");
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Syntax { location, .. } if location.line() == 2));
        assert!(reader.next().is_none());
    }
}
