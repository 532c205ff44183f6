use std::{cell::RefCell, rc::Rc};
use zephyr_dom::{Attributes, Component, Definition, Dom, Error, Listeners, MemoryDom, Template, Value};


fn bound(seen: Rc<RefCell<Vec<(Value, usize)>>>) -> Definition<MemoryDom> {
	Definition::new()
		.set_template(Template::dynamic(|this: &Component<MemoryDom>| {
			format!(r#"<input :bind="x"><input :bind="nope"><p>{}</p>"#, this.get("x"))
		}))
		.set_attributes(Attributes::new().with("x", 1))
		.set_listeners(Listeners::new().on("input", move |this: &mut Component<MemoryDom>| {
			seen.borrow_mut().push((this.get("x"), this.renders()));
			Ok(())
		}))
}

#[test]
fn input_updates_the_attribute_before_the_listener_runs() {
	logging_::init();
	let seen = Rc::default();
	let mut component = Component::new("x-bound", &bound(Rc::clone(&seen)), MemoryDom::new()).unwrap();
	let root = component.root();
	let input = component.dom().find(root, ":bind", "x").unwrap();
	assert_eq!(component.dom().value(&input).as_deref(), Some("1"));

	component.dom_mut().set_value(&input, "5").unwrap();
	component.dispatch("input", Some(&input)).unwrap();

	assert_eq!(component.get("x"), Value::Text("5".to_owned()));
	assert_eq!(*seen.borrow(), vec![(Value::Text("5".to_owned()), 2)]);
	assert_eq!(component.dom().find(root, ":bind", "x"), Some(input));
	assert_eq!(component.dom().value(&input).as_deref(), Some("5"));
	let paragraph = component.dom().find_tag(root, "p").unwrap();
	assert_eq!(component.dom().text_content(paragraph).unwrap(), "5");
}

#[test]
fn unknown_bindings_display_empty_and_are_not_written() {
	logging_::init();
	let seen = Rc::default();
	let mut component = Component::new("x-bound", &bound(Rc::clone(&seen)), MemoryDom::new()).unwrap();
	let input = component.dom().find(component.root(), ":bind", "nope").unwrap();
	assert_eq!(component.dom().value(&input).as_deref(), Some(""));

	component.dom_mut().set_value(&input, "typed").unwrap();
	component.dispatch("input", Some(&input)).unwrap();

	assert!(!component.has("nope"));
	assert_eq!(component.renders(), 1);
	assert_eq!(*seen.borrow(), vec![(Value::number(1), 1)]);
}

#[test]
fn events_without_native_listener_are_not_observed() {
	logging_::init();
	let mut component = Component::new("x-bound", &bound(Rc::default()), MemoryDom::new()).unwrap();
	let input = component.dom().find(component.root(), ":bind", "x").unwrap();
	component.dom_mut().set_value(&input, "7").unwrap();

	component.dispatch("change", Some(&input)).unwrap();
	assert_eq!(component.get("x"), Value::number(1));

	component.handle_event("change", Some(&input)).unwrap();
	assert_eq!(component.get("x"), Value::from("7"));
}

#[test]
fn listener_errors_propagate() {
	logging_::init();
	let definition = Definition::new().set_listeners(Listeners::new().on("click", |_: &mut Component<MemoryDom>| {
		Err(Error::Listener {
			event: "click".to_owned(),
			message: "refused".to_owned(),
		})
	}));
	let mut component = Component::new("x-refusing", &definition, MemoryDom::new()).unwrap();

	let error = component.dispatch("click", None).unwrap_err();
	assert!(matches!(error, Error::Listener { message, .. } if message == "refused"));
}

fn conditional() -> Definition<MemoryDom> {
	Definition::new()
		.set_template(Template::dynamic(|this: &Component<MemoryDom>| {
			format!(r#"<p :if="show">shown</p><span :if="self.n >= 0">{}</span>"#, this.get("n"))
		}))
		.set_attributes(Attributes::new().with("show", false).with("n", 1))
}

#[test]
fn falsy_conditions_remove_elements_for_good() {
	logging_::init();
	let mut component = Component::new("x-conditional", &conditional(), MemoryDom::new()).unwrap();
	let root = component.root();
	assert_eq!(component.dom().find_tag(root, "p"), None);
	let span = component.dom().find_tag(root, "span").unwrap();

	component.set("show", true).unwrap();
	assert_eq!(component.dom().find_tag(root, "p"), None);

	component.set("n", 2).unwrap();
	assert_eq!(component.dom().find_tag(root, "p"), None);
	assert_eq!(component.dom().find_tag(root, "span"), Some(span));
	assert_eq!(component.dom().text_content(root).unwrap(), "2");

	component.set("n", -1).unwrap();
	assert_eq!(component.dom().find_tag(root, "span"), None);
	component.set("n", 3).unwrap();
	assert_eq!(component.dom().find_tag(root, "span"), None);
}

#[test]
fn malformed_conditions_fail_the_render_and_remove_nothing() {
	logging_::init();
	let definition = Definition::new()
		.set_template(Template::dynamic(|this: &Component<MemoryDom>| {
			if this.get("broken").is_truthy() {
				r#"<p :if="count >">a</p><b :if="false">b</b>"#.to_owned()
			} else {
				r#"<p :if="true">a</p><b :if="true">b</b>"#.to_owned()
			}
		}))
		.set_attributes(Attributes::new().with("broken", false));
	let mut component = Component::new("x-broken", &definition, MemoryDom::new()).unwrap();

	let error = component.set("broken", true).unwrap_err();

	assert!(matches!(&error, Error::Condition { expression, .. } if expression == "count >"));
	assert_eq!(component.get("broken"), Value::Bool(true));
	assert!(component.dom().find_tag(component.root(), "b").is_some());
	assert!(component.dom().find_tag(component.root(), "p").is_some());
}

#[test]
fn malformed_conditions_fail_construction() {
	logging_::init();
	let definition = Definition::<MemoryDom>::new().set_template(r#"<p :if="alert(1)">a</p>"#);
	assert!(matches!(Component::new("x-broken", &definition, MemoryDom::new()), Err(Error::Condition { .. })));
}
