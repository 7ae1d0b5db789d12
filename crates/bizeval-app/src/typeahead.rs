// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Filter-as-you-type combobox shared by both form fields.
//!
//! The control keeps its own draft text and reports every change to its
//! owner as a [`TypeaheadEvent`]. Suggestions narrow the input but never
//! constrain it: free text is always a legal value.

use std::sync::Arc;

use crate::FieldState;

/// Per-instance capabilities: how an item maps to the committed value and
/// how it is displayed in the suggestion panel.
pub trait ItemAdapter<T> {
    fn value(&self, item: &T) -> String;

    fn render(&self, item: &T, _highlighted: bool) -> String {
        self.value(item)
    }
}

/// Identity adapter for plain string lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainText;

impl<T: AsRef<str>> ItemAdapter<T> for PlainText {
    fn value(&self, item: &T) -> String {
        item.as_ref().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeaheadEvent {
    Edited { text: String, open: bool },
    Committed { value: String },
}

impl TypeaheadEvent {
    pub fn text(&self) -> &str {
        match self {
            Self::Edited { text, .. } => text,
            Self::Committed { value } => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Typeahead<T, A = PlainText> {
    items: Arc<[T]>,
    adapter: A,
    text: String,
    filtered: Vec<usize>,
    highlighted: Option<usize>,
}

impl<T, A: Default> Typeahead<T, A> {
    pub fn new(items: impl Into<Arc<[T]>>) -> Self {
        Self::with_adapter(items, A::default())
    }
}

impl<T, A: Default> Default for Typeahead<T, A> {
    fn default() -> Self {
        Self::with_adapter(Vec::new(), A::default())
    }
}

impl<T, A> Typeahead<T, A> {
    pub fn with_adapter(items: impl Into<Arc<[T]>>, adapter: A) -> Self {
        Self {
            items: items.into(),
            adapter,
            text: String::new(),
            filtered: Vec::new(),
            highlighted: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_open(&self) -> bool {
        !self.filtered.is_empty()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn filtered(&self) -> impl Iterator<Item = &T> + '_ {
        self.filtered.iter().filter_map(|index| self.items.get(*index))
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn field_state(&self) -> FieldState {
        FieldState {
            text: self.text.clone(),
            is_open: self.is_open(),
        }
    }

    /// Hides the panel without touching the text.
    pub fn close(&mut self) {
        self.filtered.clear();
        self.highlighted = None;
    }

    pub fn highlight_next(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let max = self.filtered.len() - 1;
        self.highlighted = Some(match self.highlighted {
            None => 0,
            Some(index) => (index + 1).min(max),
        });
    }

    pub fn highlight_prev(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        self.highlighted = match self.highlighted {
            None | Some(0) => None,
            Some(index) => Some(index - 1),
        };
    }

    /// Commits `value` verbatim and closes the panel.
    pub fn on_select(&mut self, value: &str) -> TypeaheadEvent {
        self.text = value.to_owned();
        self.close();
        TypeaheadEvent::Committed {
            value: self.text.clone(),
        }
    }
}

impl<T, A: ItemAdapter<T>> Typeahead<T, A> {
    pub fn on_text_change(&mut self, new_text: &str) -> TypeaheadEvent {
        self.text = new_text.to_owned();
        self.refilter();
        TypeaheadEvent::Edited {
            text: self.text.clone(),
            open: self.is_open(),
        }
    }

    pub fn insert_char(&mut self, ch: char) -> TypeaheadEvent {
        let mut next = self.text.clone();
        next.push(ch);
        self.on_text_change(&next)
    }

    pub fn backspace(&mut self) -> TypeaheadEvent {
        let mut next = self.text.clone();
        next.pop();
        self.on_text_change(&next)
    }

    pub fn clear(&mut self) -> TypeaheadEvent {
        self.on_text_change("")
    }

    /// Opens the panel for the current text, as if it had just been typed.
    pub fn open(&mut self) -> bool {
        self.refilter();
        self.is_open()
    }

    /// Swaps the reference list. A field the user already typed into is
    /// re-filtered; an untouched field stays closed.
    pub fn set_items(&mut self, items: impl Into<Arc<[T]>>) {
        self.items = items.into();
        if self.text.is_empty() {
            self.close();
        } else {
            self.refilter();
        }
    }

    pub fn select_index(&mut self, filtered_index: usize) -> Option<TypeaheadEvent> {
        let item_index = *self.filtered.get(filtered_index)?;
        let value = self.adapter.value(self.items.get(item_index)?);
        Some(self.on_select(&value))
    }

    pub fn select_highlighted(&mut self) -> Option<TypeaheadEvent> {
        let index = self.highlighted?;
        self.select_index(index)
    }

    /// Panel rows as rendered by the adapter, paired with highlight state.
    pub fn rendered_suggestions(&self) -> Vec<(String, bool)> {
        self.filtered
            .iter()
            .enumerate()
            .filter_map(|(position, index)| {
                let item = self.items.get(*index)?;
                let highlighted = self.highlighted == Some(position);
                Some((self.adapter.render(item, highlighted), highlighted))
            })
            .collect()
    }

    fn refilter(&mut self) {
        self.filtered = filter_indices(&self.items, &self.text, &self.adapter);
        self.highlighted = None;
    }
}

/// Indices of items whose value contains `query`, ignoring case, in list order.
pub fn filter_indices<T, A: ItemAdapter<T>>(items: &[T], query: &str, adapter: &A) -> Vec<usize> {
    let needle = query.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| adapter.value(item).to_lowercase().contains(&needle))
        .map(|(index, _)| index)
        .collect()
}

pub fn filter_suggestions<'a, S: AsRef<str>>(items: &'a [S], query: &str) -> Vec<&'a str> {
    filter_indices(items, query, &PlainText)
        .into_iter()
        .map(|index| items[index].as_ref())
        .collect()
}
