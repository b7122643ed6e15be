//! Evaluation of a single [`Operation`] against a document tree.

use kdiff_core::pointer::{self, Pointer, PointerError};
use serde_json::Value;

use crate::schema::{OpKind, Operation};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Pointer(#[from] PointerError),
    #[error("{0} requires a value")]
    MissingValue(OpKind),
    #[error("move requires 'from'")]
    MissingFrom,
}

impl Operation {
    /// Apply the operation to `doc` in place.
    ///
    /// Returns `Ok(false)` only for a `test` whose expectation does not hold;
    /// that is a predicate outcome, not an error. Structural problems (missing
    /// container, bad pointer) are errors.
    pub fn apply(&self, doc: &mut Value) -> Result<bool, OperationError> {
        let path = Pointer::parse(&self.path)?;

        match self.op {
            OpKind::Test => Ok(path
                .get(doc)
                .is_some_and(|found| found == self.value_or_null())),
            OpKind::Add => {
                pointer::add(doc, &path, self.required_value()?)?;
                Ok(true)
            }
            OpKind::Replace => {
                pointer::replace(doc, &path, self.required_value()?)?;
                Ok(true)
            }
            OpKind::Remove => {
                pointer::remove(doc, &path)?;
                Ok(true)
            }
            OpKind::Move => {
                let from = self.from.as_deref().ok_or(OperationError::MissingFrom)?;
                pointer::move_value(doc, &Pointer::parse(from)?, &path)?;
                Ok(true)
            }
        }
    }

    /// Evaluate the operation as a match predicate.
    ///
    /// `test` compares the value at `path`; every other op matches when it
    /// would apply cleanly, so `remove /x` reads as "`/x` exists". The
    /// document itself is never modified.
    pub fn matches(&self, doc: &Value) -> bool {
        if self.op == OpKind::Test {
            return pointer::test(doc, &self.path, self.value_or_null());
        }
        let mut scratch = doc.clone();
        matches!(self.apply(&mut scratch), Ok(true))
    }

    fn required_value(&self) -> Result<Value, OperationError> {
        self.value.clone().ok_or(OperationError::MissingValue(self.op))
    }
}
