//! Shared widget state and selection delivery.
//!
//! A [`Session`] holds whatever the widget keeps alive (model, layout, canvas)
//! behind an `Rc<RefCell<Option<_>>>` shared with its event closures. Every
//! call runs with the state borrowed, then drains the model's queued
//! selections and hands them to subscribers once the borrow is gone, so a
//! subscriber may call straight back into the widget. Closing the session
//! empties the slot and every later call fails with [`GraphError::Destroyed`].

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use super::error::{GraphError, Result};
use super::model::GraphModel;
use super::types::Selection;

type Listener = Rc<dyn Fn(&Selection)>;

/// State that owns a [`GraphModel`] and must follow it after each mutation.
pub trait Bound {
	fn model(&self) -> &GraphModel;
	fn model_mut(&mut self) -> &mut GraphModel;
	/// Brings derived state up to date with the model.
	fn update(&mut self);
}

pub struct Session<B> {
	slot: Rc<RefCell<Option<B>>>,
	listeners: Rc<RefCell<Vec<Listener>>>,
}

impl<B> Clone for Session<B> {
	fn clone(&self) -> Self {
		Self {
			slot: self.slot.clone(),
			listeners: self.listeners.clone(),
		}
	}
}

impl<B: Bound> Session<B> {
	pub fn new(bound: B) -> Self {
		Self {
			slot: Rc::new(RefCell::new(Some(bound))),
			listeners: Rc::new(RefCell::new(Vec::new())),
		}
	}

	pub fn subscribe(&self, callback: impl Fn(&Selection) + 'static) {
		self.listeners.borrow_mut().push(Rc::new(callback));
	}

	/// Applies a model mutation, updates on success, then delivers the
	/// selections it queued. A failed mutation updates nothing.
	pub fn mutate<T>(&self, f: impl FnOnce(&mut GraphModel) -> Result<T>) -> Result<T> {
		let (out, events) = {
			let mut guard = self.slot.borrow_mut();
			let bound = guard.as_mut().ok_or(GraphError::Destroyed)?;
			let out = f(bound.model_mut())?;
			bound.update();
			(out, bound.model_mut().take_events())
		};
		self.dispatch(events);
		Ok(out)
	}

	/// Reads the model.
	pub fn query<T>(&self, f: impl FnOnce(&GraphModel) -> T) -> Result<T> {
		let guard = self.slot.borrow();
		let bound = guard.as_ref().ok_or(GraphError::Destroyed)?;
		Ok(f(bound.model()))
	}

	/// Runs `f` against the whole state, then delivers any selections it
	/// queued. `None` once closed.
	pub fn with<T>(&self, f: impl FnOnce(&mut B) -> T) -> Option<T> {
		let (out, events) = {
			let mut guard = self.slot.borrow_mut();
			let bound = guard.as_mut()?;
			let out = f(bound);
			(out, bound.model_mut().take_events())
		};
		self.dispatch(events);
		Some(out)
	}

	/// Takes the state out and drops every subscriber. `None` if already closed.
	pub fn close(&self) -> Option<B> {
		let bound = self.slot.borrow_mut().take()?;
		self.listeners.borrow_mut().clear();
		Some(bound)
	}

	fn dispatch(&self, events: Vec<Selection>) {
		if events.is_empty() {
			return;
		}
		// Clone out so subscribers may register more listeners.
		let current: Vec<Listener> = self.listeners.borrow().clone();
		for event in &events {
			debug!("select {:?}", event.id());
			for listener in &current {
				listener(event);
			}
		}
	}
}
