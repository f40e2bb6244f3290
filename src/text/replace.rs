use std::collections::HashMap;
use std::ops::Range;

use indexmap::IndexSet;
use tracing::trace;

use crate::domain::ticket::TicketKey;
use crate::text::patterns::{IssuePattern, PatternLibrary};

/// Keys substituted in one run and the byte ranges their fragments occupy.
#[derive(Debug, Default, Clone)]
pub struct ReplacementLedger {
    replaced: IndexSet<TicketKey>,
    written: Vec<Range<usize>>,
}

impl ReplacementLedger {
    pub fn contains(&self, key: &TicketKey) -> bool {
        self.replaced.contains(key)
    }

    fn record(&mut self, key: TicketKey) {
        self.replaced.insert(key);
    }

    pub fn keys(&self) -> impl Iterator<Item = &TicketKey> {
        self.replaced.iter()
    }

    fn overlaps_written(&self, span: &Range<usize>) -> bool {
        self.written
            .iter()
            .any(|range| range.start < span.end && span.start < range.end)
    }

    /// Shifts earlier ranges past this pass's edits, then records the new ones.
    fn track_edits(&mut self, edits: Vec<(Range<usize>, Range<usize>)>) {
        for range in &mut self.written {
            let shift = edits
                .iter()
                .take_while(|(old, _)| old.end <= range.start)
                .last()
                .map_or(0, |(old, new)| new.end as isize - old.end as isize);
            range.start = range.start.saturating_add_signed(shift);
            range.end = range.end.saturating_add_signed(shift);
        }
        self.written.extend(edits.into_iter().map(|(_, new)| new));
    }
}

#[derive(Debug, Clone)]
pub struct Replacement {
    pub text: String,
    pub ledger: ReplacementLedger,
}

impl Replacement {
    fn apply(self, pattern: &IssuePattern, fragments: &HashMap<TicketKey, String>) -> Self {
        let Replacement { text, mut ledger } = self;
        let mut output = String::with_capacity(text.len());
        let mut last = 0;
        let mut edits = Vec::new();

        for found in pattern.find_iter(&text) {
            // Fragments written earlier in this run are never rescanned.
            if ledger.overlaps_written(&(found.start..found.end)) {
                continue;
            }
            output.push_str(&text[last..found.start]);
            match fragments.get(&found.key) {
                Some(fragment) if !ledger.contains(&found.key) => {
                    trace!(
                        key = %found.key,
                        url = ?found.url,
                        description = ?found.description,
                        "substituting reference"
                    );
                    let start = output.len();
                    output.push_str(fragment);
                    edits.push((found.start..found.end, start..output.len()));
                    ledger.record(found.key);
                }
                _ => output.push_str(found.full),
            }
            last = found.end;
        }
        output.push_str(&text[last..]);
        ledger.track_edits(edits);

        Replacement {
            text: output,
            ledger,
        }
    }
}

pub fn replace_issues(
    text: &str,
    library: &PatternLibrary,
    fragments: &HashMap<TicketKey, String>,
) -> Replacement {
    let seed = Replacement {
        text: text.to_string(),
        ledger: ReplacementLedger::default(),
    };
    library
        .patterns()
        .iter()
        .fold(seed, |acc, pattern| acc.apply(pattern, fragments))
}
