//! Human-readable interpreter state, written by `BREAK` and by the
//! per-instruction dump mode.

use std::io::{self, Write};

use crate::frames::{Frame, FrameStore, Scope};
use crate::values::Value;
use crate::vm::Stack;

/// Borrowed view of everything the dump shows.
pub struct Snapshot<'a> {
    /// Index of the instruction being executed.
    pub counter: usize,
    pub executed: u64,
    pub store: &'a FrameStore,
    pub data: &'a Stack<Value>,
    pub calls: &'a Stack<usize>,
}

pub fn write_state(out: &mut dyn Write, snapshot: &Snapshot<'_>) -> io::Result<()> {
    writeln!(
        out,
        "-- at instruction {}, {} executed --",
        snapshot.counter + 1,
        snapshot.executed
    )?;

    write_frame(out, Scope::Global.prefix(), snapshot.store.frame(Scope::Global))?;
    write_frame(out, Scope::Temporary.prefix(), snapshot.store.frame(Scope::Temporary))?;
    writeln!(out, "frame stack depth: {}", snapshot.store.depth())?;
    for (level, frame) in snapshot.store.local_frames().rev().enumerate() {
        let name = if level == 0 {
            Scope::Local.prefix().to_string()
        } else {
            format!("LF-{}", level)
        };
        write_frame(out, &name, Some(frame))?;
    }

    write!(out, "data stack ({}):", snapshot.data.len())?;
    for value in snapshot.data.iter() {
        write!(out, " {}", value.literal())?;
    }
    writeln!(out)?;

    write!(out, "call stack ({}):", snapshot.calls.len())?;
    for index in snapshot.calls.iter() {
        write!(out, " {}", index + 1)?;
    }
    writeln!(out)
}

fn write_frame(out: &mut dyn Write, name: &str, frame: Option<&Frame>) -> io::Result<()> {
    let Some(frame) = frame else {
        return writeln!(out, "{}: undefined", name);
    };
    write!(out, "{}:", name)?;
    for (var, slot) in frame.sorted() {
        match slot {
            Some(value) => write!(out, " {}={}", var, value.literal())?,
            None => write!(out, " {}=<unset>", var)?,
        }
    }
    writeln!(out)
}
