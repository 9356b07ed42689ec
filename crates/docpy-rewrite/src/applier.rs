//! Replacement planning and streaming application
//!
//! The applier makes one forward pass over the source. Between two
//! replacements it copies whole lines first and then the remaining columns
//! of the target line, so it never needs random access to the input.

use docpy_core::{Error, Result, SourceDistance, SourceLocation, SourceReplacement};
use std::io::{BufRead, Read, Write};
use tracing::debug;

/// Order `replacements` by start location and reject overlaps.
///
/// The sort is stable: insertions sharing a location keep the order in
/// which they were collected and are applied back to back.
pub fn plan(mut replacements: Vec<SourceReplacement>) -> Result<Vec<SourceReplacement>> {
    replacements.sort_by_key(|r| r.range.start);

    for pair in replacements.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.range.start < previous.range.end() {
            return Err(Error::OverlappingReplacements {
                previous: previous.range.start,
                next: next.range.start,
            });
        }
    }

    Ok(replacements)
}

/// Stream `source` to `dest`, splicing in `replacements`.
///
/// `replacements` must be ordered and free of overlaps, see [`plan`].
pub fn apply<R: BufRead, W: Write>(
    source: R,
    dest: W,
    replacements: &[SourceReplacement],
) -> Result<()> {
    ReplacementApplier::new(source, dest).execute(replacements)
}

/// Whether applying `replacements` changes anything at all
pub fn changes_source(replacements: &[SourceReplacement]) -> bool {
    replacements
        .iter()
        .any(|r| !r.range.is_empty() || !r.replacement.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Copy,
    Skip,
}

struct ReplacementApplier<R, W> {
    source: R,
    dest: W,
    /// Location of the next unread source byte
    position: SourceLocation,
    line: Vec<u8>,
}

impl<R: BufRead, W: Write> ReplacementApplier<R, W> {
    fn new(source: R, dest: W) -> Self {
        Self {
            source,
            dest,
            position: SourceLocation::START,
            line: Vec::new(),
        }
    }

    fn execute(mut self, replacements: &[SourceReplacement]) -> Result<()> {
        for replacement in replacements {
            let start = replacement.range.start;
            if start < self.position {
                return Err(Error::OverlappingReplacements {
                    previous: self.position,
                    next: start,
                });
            }

            debug!("Applying replacement at {}", start);
            self.advance(start - self.position, Transfer::Copy)?;
            self.advance(replacement.range.length, Transfer::Skip)?;
            self.dest.write_all(replacement.replacement.as_bytes())?;
        }

        // write rest
        std::io::copy(&mut self.source, &mut self.dest)?;
        self.dest.flush()?;
        Ok(())
    }

    fn advance(&mut self, distance: SourceDistance, transfer: Transfer) -> Result<()> {
        for _ in 0..distance.lines {
            self.line.clear();
            let read = self.source.read_until(b'\n', &mut self.line)?;
            if read == 0 {
                return Err(Error::ReplacementOutOfBounds(format!(
                    "input ends before line {}",
                    self.position.line + 1
                )));
            }
            if transfer == Transfer::Copy {
                self.dest.write_all(&self.line)?;
                if !self.line.ends_with(b"\n") {
                    // last line without a line break: give the next line a start
                    self.dest.write_all(b"\n")?;
                }
            }
            self.position = self.position.next_line();
        }

        if distance.columns > 0 {
            self.line.clear();
            (&mut self.source)
                .take(distance.columns as u64)
                .read_to_end(&mut self.line)?;
            if self.line.len() < distance.columns || self.line.contains(&b'\n') {
                return Err(Error::ReplacementOutOfBounds(format!(
                    "line {} is shorter than column {}",
                    self.position.line,
                    self.position.column + distance.columns
                )));
            }
            if transfer == Transfer::Copy {
                self.dest.write_all(&self.line)?;
            }
            self.position.column += distance.columns;
        }

        Ok(())
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn apply_bytes(source: &str, replacements: &[SourceReplacement]) -> Vec<u8> {
        let mut out = Vec::new();
        apply(source.as_bytes(), &mut out, replacements).unwrap();
        out
    }

    proptest! {
        #[test]
        fn insert_matches_splice(
            source in "[a-z \t\r\näö]{0,60}",
            offset in 0..64usize,
            text in "[#a-z \n]{0,12}",
        ) {
            let offset = offset.min(source.len());
            let location = SourceLocation::from_offset(&source, offset);

            let mut expected = source.as_bytes()[..offset].to_vec();
            expected.extend_from_slice(text.as_bytes());
            expected.extend_from_slice(&source.as_bytes()[offset..]);

            let output = apply_bytes(&source, &[SourceReplacement::insert(location, text.clone())]);
            prop_assert_eq!(output, expected);
        }

        #[test]
        fn two_inserts_match_splices(
            source in "[a-z\nü]{0,40}",
            a in 0..48usize,
            b in 0..48usize,
        ) {
            let (a, b) = (a.min(b).min(source.len()), a.max(b).min(source.len()));
            // equal offsets keep collection order
            let planned = plan(vec![
                SourceReplacement::insert(SourceLocation::from_offset(&source, a), "A"),
                SourceReplacement::insert(SourceLocation::from_offset(&source, b), "B"),
            ])
            .unwrap();

            let mut expected = source.as_bytes()[..a].to_vec();
            expected.push(b'A');
            expected.extend_from_slice(&source.as_bytes()[a..b]);
            expected.push(b'B');
            expected.extend_from_slice(&source.as_bytes()[b..]);

            prop_assert_eq!(apply_bytes(&source, &planned), expected);
        }
    }
}
