// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Argument entry for a selected operation.
//!
//! An [`ArgumentForm`] holds one free-text [`FieldState`] per declared parameter, sorted by name.
//! Text is only interpreted when the form is submitted: [`ArgumentForm::coerce`] converts every
//! field to its declared JSON type and never fails. Unparseable input is replaced by the type's
//! zero value and reported as a [`CoercionWarning`].

use std::fmt;

use serde_json::{Map, Value};

use crate::model::{Operation, ParamType};

/// Maximum number of characters a field accepts.
pub const FIELD_CHAR_LIMIT: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    name: String,
    param_type: ParamType,
    description: String,
    required: bool,
    text: String,
    cursor: usize,
    focused: bool,
}

impl FieldState {
    fn new(name: &str, param_type: ParamType, description: &str, required: bool) -> Self {
        Self {
            name: name.to_owned(),
            param_type,
            description: description.to_owned(),
            required,
            text: String::new(),
            cursor: 0,
            focused: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> &ParamType {
        &self.param_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().take(FIELD_CHAR_LIMIT).collect();
        self.cursor = self.text.chars().count();
    }

    pub fn insert_char(&mut self, ch: char) {
        if self.text.chars().count() >= FIELD_CHAR_LIMIT {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_offset(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.text.chars().count() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text.char_indices().nth(char_idx).map(|(idx, _)| idx).unwrap_or(self.text.len())
    }
}

/// What happened after the operator advanced past the focused field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentForm {
    operation_name: String,
    fields: Vec<FieldState>,
    focus: usize,
}

impl ArgumentForm {
    /// Builds the form for `operation`, or `None` when it declares no parameters.
    pub fn build(operation: &Operation) -> Option<Self> {
        if !operation.takes_arguments() {
            return None;
        }

        let mut params = operation.parameters().iter().collect::<Vec<_>>();
        params.sort_by(|a, b| a.name().cmp(b.name()));

        let mut fields = params
            .into_iter()
            .map(|param| {
                FieldState::new(
                    param.name(),
                    param.param_type().clone(),
                    param.description(),
                    param.required(),
                )
            })
            .collect::<Vec<_>>();
        fields[0].focused = true;

        Some(Self { operation_name: operation.name().to_owned(), fields, focus: 0 })
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn focused_index(&self) -> usize {
        self.focus
    }

    pub fn focused_field_mut(&mut self) -> &mut FieldState {
        &mut self.fields[self.focus]
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldState> {
        self.fields.iter_mut().find(|field| field.name == name)
    }

    pub fn is_last_focused(&self) -> bool {
        self.focus + 1 == self.fields.len()
    }

    /// Moves to the next field, or reports that the form is complete when on the last one.
    pub fn advance(&mut self) -> Advance {
        if self.is_last_focused() {
            return Advance::Submit;
        }
        self.set_focus(self.focus + 1);
        Advance::Moved
    }

    /// Moves to the next field, wrapping to the first after the last.
    pub fn cycle(&mut self) {
        self.set_focus((self.focus + 1) % self.fields.len());
    }

    fn set_focus(&mut self, idx: usize) {
        self.fields[self.focus].focused = false;
        self.focus = idx;
        self.fields[self.focus].focused = true;
    }

    /// Converts every field to its declared type.
    pub fn coerce(&self) -> CoercedArguments {
        let mut arguments = Map::new();
        let mut warnings = Vec::new();

        for field in &self.fields {
            let value = match coerce_field(&field.param_type, &field.text) {
                Ok(value) => value,
                Err(fallback) => {
                    warnings.push(CoercionWarning {
                        field: field.name.clone(),
                        expected: field.param_type.clone(),
                        input: field.text.clone(),
                        fallback: fallback.clone(),
                    });
                    fallback
                }
            };
            arguments.insert(field.name.clone(), value);
        }

        CoercedArguments { arguments, warnings }
    }
}

/// Converts raw field text to a JSON value of the declared type.
///
/// `Err` carries the fallback value to send instead.
pub fn coerce_field(param_type: &ParamType, raw: &str) -> Result<Value, Value> {
    let trimmed = raw.trim();
    match param_type {
        ParamType::Number => {
            if trimmed.is_empty() {
                return Ok(Value::from(0.0));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or(Value::from(0.0))
        }
        ParamType::Integer => {
            if trimmed.is_empty() {
                return Ok(Value::from(0));
            }
            trimmed.parse::<i64>().map(Value::from).map_err(|_| Value::from(0))
        }
        ParamType::Boolean => {
            if trimmed.is_empty() {
                return Ok(Value::Bool(false));
            }
            parse_bool(trimmed).map(Value::Bool).ok_or(Value::Bool(false))
        }
        ParamType::String | ParamType::Other(_) => Ok(Value::String(raw.to_owned())),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoercionWarning {
    pub field: String,
    pub expected: ParamType,
    pub input: String,
    pub fallback: Value,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error converting arg '{}' to {}: invalid input {:?}, sending {}",
            self.field, self.expected, self.input, self.fallback
        )
    }
}

/// Call payload produced by [`ArgumentForm::coerce`].
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedArguments {
    pub arguments: Map<String, Value>,
    pub warnings: Vec<CoercionWarning>,
}
