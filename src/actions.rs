//! Named widget actions (`"launch"`, `"edit"`, `"delete"`, …).
//!
//! Any number of handlers can be registered under one key; executing the key
//! runs all of them, in registration order, with the subject widget.

use crate::widget::Widget;
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// Identifies one registered handler so it can be unregistered later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&Widget)>;

/// Errors from misusing the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("invalid action key {0:?}")]
    InvalidKey(String),
}

/// Handlers keyed by action name.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<String, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        counts.sort();
        f.debug_struct("ActionRegistry")
            .field("handlers", &counts)
            .finish()
    }
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `key`.
    ///
    /// Blank keys are rejected and leave the registry untouched.
    pub fn register(
        &mut self,
        key: &str,
        handler: impl FnMut(&Widget) + 'static,
    ) -> Result<HandlerId, ActionError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ActionError::InvalidKey(key.to_string()));
        }
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(key.to_string())
            .or_default()
            .push((id, Box::new(handler)));
        debug!("registered handler {:?} for action {:?}", id, key);
        Ok(id)
    }

    /// Remove one handler.  Returns whether it was registered under `key`.
    pub fn unregister(&mut self, key: &str, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(key.trim()) else {
            return false;
        };
        let before = list.len();
        list.retain(|(hid, _)| *hid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(key.trim());
        }
        removed
    }

    /// Run every handler registered under `key`.  Returns how many ran.
    pub fn execute(&mut self, key: &str, widget: &Widget) -> usize {
        match self.handlers.get_mut(key.trim()) {
            Some(list) => {
                for (_, handler) in list.iter_mut() {
                    handler(widget);
                }
                list.len()
            }
            None => 0,
        }
    }

    /// Number of handlers registered under `key`.
    pub fn count(&self, key: &str) -> usize {
        self.handlers.get(key.trim()).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessSurface;
    use crate::widget::WidgetDescriptor;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn widget() -> Widget {
        let mut s = HeadlessSurface::default();
        Widget::from_descriptor(&mut s, WidgetDescriptor::app("mail", "Mail", "x")).unwrap()
    }

    #[test]
    fn execute_runs_all_handlers_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut reg = ActionRegistry::new();
        for tag in ["first", "second"] {
            let log = log.clone();
            reg.register("launch", move |w| {
                log.borrow_mut().push(format!("{}:{}", tag, w.id()))
            })
            .unwrap();
        }
        assert_eq!(reg.execute("launch", &widget()), 2);
        assert_eq!(*log.borrow(), vec!["first:mail", "second:mail"]);
    }

    #[test]
    fn unknown_key_runs_nothing() {
        let mut reg = ActionRegistry::new();
        assert_eq!(reg.execute("edit", &widget()), 0);
    }

    #[test]
    fn unregister_removes_only_that_handler() {
        let hits = Rc::new(RefCell::new(0));
        let mut reg = ActionRegistry::new();
        let h1 = {
            let hits = hits.clone();
            reg.register("edit", move |_| *hits.borrow_mut() += 1).unwrap()
        };
        let _h2 = {
            let hits = hits.clone();
            reg.register("edit", move |_| *hits.borrow_mut() += 10).unwrap()
        };
        assert!(reg.unregister("edit", h1));
        assert!(!reg.unregister("edit", h1));
        reg.execute("edit", &widget());
        assert_eq!(*hits.borrow(), 10);
        assert_eq!(reg.count("edit"), 1);
    }

    #[test]
    fn blank_key_is_rejected_without_mutation() {
        let mut reg = ActionRegistry::new();
        let err = reg.register("   ", |_| {}).unwrap_err();
        assert_eq!(err, ActionError::InvalidKey(String::new()));
        assert_eq!(format!("{:?}", reg), "ActionRegistry { handlers: [] }");
    }
}
