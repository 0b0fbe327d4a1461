use crate::value::{Builtin, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// One scope level. Frames are never changed after construction; a child
/// holds a shared handle to the frame it was created under.
#[derive(Debug)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// The root frame, holding the builtins.
    pub fn root() -> Rc<Self> {
        let bindings = Builtin::ALL
            .iter()
            .map(|builtin| (builtin.name().to_string(), Value::Builtin(*builtin)))
            .collect();
        Rc::new(Self {
            bindings,
            parent: None,
        })
    }

    pub fn extend<I>(parent: &Rc<Environment>, bindings: I) -> Rc<Self>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Rc::new(Self {
            bindings: bindings.into_iter().collect(),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Resolves `name` in the innermost frame that binds it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut frame = self;
        loop {
            if let Some(value) = frame.bindings.get(name) {
                return Some(value);
            }
            frame = frame.parent.as_deref()?;
        }
    }

    /// Number of frames from here to the root, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut frame = self;
        while let Some(parent) = frame.parent.as_deref() {
            depth += 1;
            frame = parent;
        }
        depth
    }
}
