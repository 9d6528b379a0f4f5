use tracing::trace;

use crate::frames::{Frame, Scope, Slot};
use crate::program::VarRef;
use crate::values::Value;
use crate::vm::{FatalError, Stack};

/// Owner of every frame: the global frame, the optional temporary frame and
/// the frame stack whose top is the local frame.
#[derive(Debug, Default)]
pub struct FrameStore {
    global: Frame,
    temporary: Option<Frame>,
    locals: Stack<Frame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active frame for `scope`, if there is one.
    pub fn get_frame(&mut self, scope: Scope) -> Option<&mut Frame> {
        match scope {
            Scope::Global => Some(&mut self.global),
            Scope::Local => self.locals.peek_mut(),
            Scope::Temporary => self.temporary.as_mut(),
        }
    }

    pub fn frame(&self, scope: Scope) -> Option<&Frame> {
        match scope {
            Scope::Global => Some(&self.global),
            Scope::Local => self.locals.peek(),
            Scope::Temporary => self.temporary.as_ref(),
        }
    }

    fn require(&self, scope: Scope) -> Result<&Frame, FatalError> {
        self.frame(scope).ok_or(FatalError::MissingFrame(scope))
    }

    fn require_mut(&mut self, scope: Scope) -> Result<&mut Frame, FatalError> {
        self.get_frame(scope).ok_or(FatalError::MissingFrame(scope))
    }

    /// Declare an unset variable.
    pub fn define(&mut self, var: &VarRef) -> Result<(), FatalError> {
        if self.require_mut(var.scope)?.declare(&var.name) {
            Ok(())
        } else {
            Err(FatalError::Redefinition(var.clone()))
        }
    }

    /// Whether the slot exists, set or not.
    pub fn is_defined(&self, var: &VarRef) -> Result<bool, FatalError> {
        Ok(self.require(var.scope)?.contains(&var.name))
    }

    /// The slot itself, so callers can tell "unset" from "holds a value".
    pub fn slot(&self, var: &VarRef) -> Result<&Slot, FatalError> {
        self.require(var.scope)?
            .slot(&var.name)
            .ok_or_else(|| FatalError::UndefinedVariable(var.clone()))
    }

    pub fn read(&self, var: &VarRef) -> Result<&Value, FatalError> {
        self.slot(var)?
            .as_ref()
            .ok_or_else(|| FatalError::MissingValue(var.clone()))
    }

    pub fn write(&mut self, var: &VarRef, value: Value) -> Result<(), FatalError> {
        let slot = self
            .require_mut(var.scope)?
            .slot_mut(&var.name)
            .ok_or_else(|| FatalError::UndefinedVariable(var.clone()))?;
        *slot = Some(value);
        Ok(())
    }

    /// Replace the temporary frame with a fresh one, dropping any old one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// Push the temporary frame; it becomes the local frame.
    pub fn promote_temporary(&mut self) -> Result<(), FatalError> {
        let frame = self
            .temporary
            .take()
            .ok_or(FatalError::MissingFrame(Scope::Temporary))?;
        self.locals.push(frame);
        trace!(depth = self.locals.len(), "pushed frame");
        Ok(())
    }

    /// Pop the local frame; it becomes the temporary frame.
    pub fn demote_local(&mut self) -> Result<(), FatalError> {
        let frame = self
            .locals
            .pop()
            .ok_or(FatalError::MissingFrame(Scope::Local))?;
        self.temporary = Some(frame);
        trace!(depth = self.locals.len(), "popped frame");
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.locals.len()
    }

    /// Local frames from the bottom of the frame stack to the top.
    pub fn local_frames(&self) -> impl DoubleEndedIterator<Item = &Frame> {
        self.locals.iter()
    }
}
