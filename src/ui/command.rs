//! Deferred, type-erased units of work bound to UI elements
//!
//! A [`Command`] is created when an element is wired up and executed later,
//! without further input, when that element reports interaction. Whatever the
//! command needs (a camera handle, a shader library, a uniform name) is
//! captured at bind time.

use std::fmt;

/// A boxed callable with its argument snapshot already applied.
///
/// Commands never return a value; results travel through the state the
/// closure captured (usually a [`Shared`](crate::Shared) handle).
pub struct Command {
    action: Box<dyn FnMut()>,
}

impl Command {
    /// Wraps a zero-argument closure.
    ///
    /// ```
    /// use std::{cell::Cell, rc::Rc};
    /// use tinkerbox::ui::Command;
    ///
    /// let hits = Rc::new(Cell::new(0));
    /// let counter = Rc::clone(&hits);
    /// let mut command = Command::new(move || counter.set(counter.get() + 1));
    /// command.execute();
    /// assert_eq!(hits.get(), 1);
    /// ```
    pub fn new<F>(action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self {
            action: Box::new(action),
        }
    }

    /// Binds a callable to a fixed snapshot of arguments.
    ///
    /// The arguments are moved into the command once and handed to the
    /// callable by reference on every execution; they cannot be re-supplied.
    ///
    /// ```
    /// use std::{cell::RefCell, rc::Rc};
    /// use tinkerbox::ui::Command;
    ///
    /// let log = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&log);
    /// let mut command = Command::bind(
    ///     move |(name, value): &(String, f32)| sink.borrow_mut().push(format!("{name}={value}")),
    ///     ("roughness".to_string(), 0.5),
    /// );
    /// command.execute();
    /// command.execute();
    /// assert_eq!(log.borrow().as_slice(), ["roughness=0.5", "roughness=0.5"]);
    /// ```
    pub fn bind<F, A>(mut callable: F, args: A) -> Self
    where
        F: FnMut(&A) + 'static,
        A: 'static,
    {
        Self::new(move || callable(&args))
    }

    /// Runs the bound callable with exactly the captured arguments.
    pub fn execute(&mut self) {
        (self.action)();
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    #[test]
    fn test_execute_runs_callable_each_time() {
        let hits = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&hits);
        let mut command = Command::new(move || counter.set(counter.get() + 1));

        assert_eq!(hits.get(), 0);
        command.execute();
        command.execute();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_bound_arguments_are_a_snapshot() {
        let seen = Rc::new(Cell::new(0.0f32));
        let sink = Rc::clone(&seen);

        let mut value = 3.0f32;
        let mut command = Command::bind(move |v: &f32| sink.set(*v), value);
        value = 7.0;

        command.execute();
        assert_eq!(seen.get(), 3.0);
        assert_eq!(value, 7.0);
    }

    #[test]
    fn test_dropping_command_releases_captures() {
        let shared = Rc::new(Cell::new(1));
        let captured = Rc::clone(&shared);
        let command = Command::new(move || captured.set(2));

        assert_eq!(Rc::strong_count(&shared), 2);
        drop(command);
        assert_eq!(Rc::strong_count(&shared), 1);
    }
}
