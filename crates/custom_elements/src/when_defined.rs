//! One-shot deferred-definition futures.
//!
//! One shared settle-once cell per name; every `when_defined` call for a
//! pending name hands out a handle to the same cell, and registration
//! settles it exactly once. Handles are inspectable without an executor and
//! also implement `Future` for hosts that want to await them.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::error::NameError;

#[derive(Debug)]
enum State {
    Pending { waker: Option<Waker> },
    Resolved,
    Rejected(NameError),
}

#[derive(Debug)]
pub(crate) struct OneShot {
    state: RefCell<State>,
}

impl OneShot {
    pub fn pending() -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(State::Pending { waker: None }),
        })
    }

    pub fn resolve(&self) {
        let prev = std::mem::replace(&mut *self.state.borrow_mut(), State::Resolved);
        if let State::Pending { waker: Some(waker) } = prev {
            waker.wake();
        }
    }
}

/// Handle to a pending, resolved, or rejected `when_defined` future.
/// Clones share the same settlement.
#[derive(Clone, Debug)]
pub struct WhenDefined {
    inner: Rc<OneShot>,
}

impl WhenDefined {
    pub(crate) fn pending(inner: Rc<OneShot>) -> Self {
        Self { inner }
    }

    pub(crate) fn resolved() -> Self {
        Self {
            inner: Rc::new(OneShot {
                state: RefCell::new(State::Resolved),
            }),
        }
    }

    pub(crate) fn rejected(error: NameError) -> Self {
        Self {
            inner: Rc::new(OneShot {
                state: RefCell::new(State::Rejected(error)),
            }),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.inner.state.borrow(), State::Pending { .. })
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.inner.state.borrow(), State::Resolved)
    }

    pub fn error(&self) -> Option<NameError> {
        match &*self.inner.state.borrow() {
            State::Rejected(err) => Some(err.clone()),
            _ => None,
        }
    }
}

impl Future for WhenDefined {
    type Output = Result<(), NameError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut *self.inner.state.borrow_mut() {
            State::Pending { waker } => {
                *waker = Some(cx.waker().clone());
                Poll::Pending
            }
            State::Resolved => Poll::Ready(Ok(())),
            State::Rejected(err) => Poll::Ready(Err(err.clone())),
        }
    }
}
