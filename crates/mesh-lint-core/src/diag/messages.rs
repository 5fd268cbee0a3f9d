//! Ordered message collections.

use super::level::Level;
use super::message::Message;
use serde::Serialize;

/// An ordered collection of messages.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Messages(Vec<Message>);

impl Messages {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn add(&mut self, message: Message) {
        self.0.push(message);
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the messages.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }

    /// Iterates mutably over the messages.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Message> {
        self.0.iter_mut()
    }

    /// Returns the messages as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.0
    }

    /// Sorts by level ordinal, code, origin, then rendered text.
    ///
    /// Messages without a resource sort before those with one.
    pub fn sort(&mut self) {
        self.0.sort_by_cached_key(|m| {
            (
                m.level().ordinal(),
                m.code().to_string(),
                m.resource().map(|r| r.origin().comparator()),
                m.render(),
            )
        });
    }

    /// Returns a sorted copy with adjacent identically rendered messages collapsed.
    #[must_use]
    pub fn sorted_deduped_copy(&self) -> Self {
        let mut sorted = self.clone();
        sorted.sort();

        let mut deduped: Vec<Message> = Vec::with_capacity(sorted.len());
        let mut last: Option<String> = None;
        for message in sorted.0 {
            let rendered = message.render();
            if last.as_deref() == Some(rendered.as_str()) {
                continue;
            }
            last = Some(rendered);
            deduped.push(message);
        }
        Self(deduped)
    }

    /// Keeps messages whose level ordinal is at most `threshold`'s.
    ///
    /// Under the level encoding, `Error` has the smallest ordinal of the real
    /// levels, so a `Warning` threshold keeps errors and warnings.
    #[must_use]
    pub fn filter_out_lower_than(&self, threshold: Level) -> Self {
        self.0
            .iter()
            .filter(|m| m.level().ordinal() <= threshold.ordinal())
            .cloned()
            .collect()
    }

    /// Stamps `tag` onto every message's documentation link.
    pub fn set_doc_ref(&mut self, tag: &str) -> &mut Self {
        for message in &mut self.0 {
            message.set_doc_ref(tag);
        }
        self
    }

    /// Returns true if any message is at `Error` level.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|m| m.level() == Level::Error)
    }

    /// Returns counts of (errors, warnings, infos).
    #[must_use]
    pub fn count_by_level(&self) -> (usize, usize, usize) {
        let mut errors = 0;
        let mut warnings = 0;
        let mut infos = 0;
        for m in &self.0 {
            match m.level() {
                Level::Error => errors += 1,
                Level::Warning => warnings += 1,
                Level::Info => infos += 1,
                Level::Unknown => {}
            }
        }
        (errors, warnings, infos)
    }
}

impl Extend<Message> for Messages {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<Message> for Messages {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Messages {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Messages {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Message>> for Messages {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}
