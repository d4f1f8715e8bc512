//! Persist notification channel
//!
//! One-directional: the application sends payloads, subscribers receive
//! them. Delivery is synchronous, in emission order, one message at a time.
//! A send issued while a message is being delivered (from inside a handler)
//! is queued and delivered once the current message has reached every
//! subscriber.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

type Handler = Box<dyn FnMut(&Value)>;

#[derive(Default)]
struct PortInner {
    handlers: Vec<Handler>,
    /// Registered handlers, including any moved out for delivery
    subscribers: usize,
    queue: VecDeque<Value>,
    dispatching: bool,
}

/// Handlers moved out of the port while one message is delivered
///
/// Dropping puts them back, after any subscribed during delivery. If a
/// handler panicked, undelivered messages are discarded and the port is
/// ready for the next `send`.
struct Delivery<'a> {
    inner: &'a RefCell<PortInner>,
    handlers: Vec<Handler>,
}

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        let added = std::mem::take(&mut inner.handlers);
        let mut handlers = std::mem::take(&mut self.handlers);
        handlers.extend(added);
        inner.handlers = handlers;
        if std::thread::panicking() {
            inner.queue.clear();
            inner.dispatching = false;
        }
    }
}

/// Cloneable handle to a persist channel; clones share subscribers
#[derive(Clone, Default)]
pub struct PersistPort {
    inner: Rc<RefCell<PortInner>>,
}

impl PersistPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; handlers run in subscription order
    pub fn subscribe(&self, handler: impl FnMut(&Value) + 'static) {
        let mut inner = self.inner.borrow_mut();
        inner.handlers.push(Box::new(handler));
        inner.subscribers += 1;
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers
    }

    /// Emit a payload to every subscriber
    pub fn send(&self, payload: Value) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(payload);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }

        loop {
            // Handlers are moved out while running so they may call back into
            // the port without hitting an outstanding borrow.
            let (payload, mut delivery) = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.pop_front() {
                    Some(payload) => {
                        let handlers = std::mem::take(&mut inner.handlers);
                        (
                            payload,
                            Delivery {
                                inner: &self.inner,
                                handlers,
                            },
                        )
                    }
                    None => {
                        inner.dispatching = false;
                        return;
                    }
                }
            };

            for handler in delivery.handlers.iter_mut() {
                handler(&payload);
            }
        }
    }
}

impl fmt::Debug for PersistPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("PersistPort")
            .field("subscribers", &inner.subscribers)
            .field("queued", &inner.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(port: &PersistPort) -> Rc<RefCell<Vec<Value>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        port.subscribe(move |v| sink.borrow_mut().push(v.clone()));
        seen
    }

    #[test]
    fn test_delivers_in_emission_order() {
        let port = PersistPort::new();
        let seen = recorder(&port);

        for uid in 0..5 {
            port.send(json!({ "uid": uid }));
        }

        let uids: Vec<_> = seen.borrow().iter().map(|v| v["uid"].clone()).collect();
        assert_eq!(uids, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_send_without_subscribers_is_dropped() {
        let port = PersistPort::new();
        port.send(json!(1));
        let seen = recorder(&port);
        port.send(json!(2));
        assert_eq!(*seen.borrow(), vec![json!(2)]);
    }

    #[test]
    fn test_all_subscribers_in_order() {
        let port = PersistPort::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second"] {
            let log = log.clone();
            port.subscribe(move |_| log.borrow_mut().push(name));
        }
        port.send(json!(null));
        assert_eq!(*log.borrow(), vec!["first", "second"]);
        assert_eq!(port.subscriber_count(), 2);
    }

    #[test]
    fn test_reentrant_send_is_queued() {
        let port = PersistPort::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        {
            let port_handle = port.clone();
            let log = log.clone();
            port.subscribe(move |v| {
                log.borrow_mut().push(format!("a:{}", v));
                if v == &json!(1) {
                    port_handle.send(json!(2));
                }
            });
        }
        {
            let log = log.clone();
            port.subscribe(move |v| log.borrow_mut().push(format!("b:{}", v)));
        }

        port.send(json!(1));

        // Message 1 reaches both handlers before message 2 starts
        assert_eq!(*log.borrow(), vec!["a:1", "b:1", "a:2", "b:2"]);
    }

    #[test]
    fn test_subscribe_during_delivery() {
        let port = PersistPort::new();
        let late = Rc::new(RefCell::new(Vec::new()));

        {
            let port_handle = port.clone();
            let late = late.clone();
            let mut done = false;
            port.subscribe(move |_| {
                if !done {
                    done = true;
                    let late = late.clone();
                    port_handle.subscribe(move |v| late.borrow_mut().push(v.clone()));
                }
            });
        }

        port.send(json!("first"));
        port.send(json!("second"));

        assert_eq!(port.subscriber_count(), 2);
        assert_eq!(*late.borrow(), vec![json!("second")]);
    }

    #[test]
    fn test_subscriber_count_during_delivery() {
        let port = PersistPort::new();
        let counts = Rc::new(RefCell::new(Vec::new()));
        {
            let port_handle = port.clone();
            let counts = counts.clone();
            port.subscribe(move |_| counts.borrow_mut().push(port_handle.subscriber_count()));
        }
        port.send(json!(1));
        assert_eq!(*counts.borrow(), vec![1]);
    }

    #[test]
    fn test_port_recovers_after_handler_panic() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let port = PersistPort::new();
        {
            let port_handle = port.clone();
            port.subscribe(move |v| {
                if v == &json!("boom") {
                    // Queued behind the failing message, dropped with it
                    port_handle.send(json!("lost"));
                    panic!("handler failed");
                }
            });
        }
        let seen = recorder(&port);

        let result = catch_unwind(AssertUnwindSafe(|| port.send(json!("boom"))));
        assert!(result.is_err());

        port.send(json!("after"));
        assert_eq!(port.subscriber_count(), 2);
        assert_eq!(*seen.borrow(), vec![json!("after")]);
    }
}
