use zephyr_dom::{Attribute, Attributes, Component, Definition, MemoryDom, Registry, Template, Value};


fn counter() -> Definition<MemoryDom> {
	Definition::new()
		.set_template(Template::dynamic(|this: &Component<MemoryDom>| format!("<p>{}</p>", this.get("count"))))
		.set_attributes(
			Attributes::new()
				.with("count", 3)
				.with_computed("double", |this| Value::number(this.get("count").to_number().unwrap_or(0.0) * 2.0)),
		)
}

#[test]
fn reads_resolve_values_and_computations() {
	logging_::init();
	let component = Component::new("x-counter", &counter(), MemoryDom::new()).unwrap();

	assert_eq!(component.get("count"), Value::Number(3.0));
	assert_eq!(component.get("double"), Value::Number(6.0));
	assert!(component.has("double"));
	assert!(!component.has("missing"));
	assert_eq!(component.get("missing"), Value::Null);
}

#[test]
fn writes_render_once_unless_computed() {
	logging_::init();
	let mut component = Component::new("x-counter", &counter(), MemoryDom::new()).unwrap();
	assert_eq!(component.renders(), 1);

	component.set("count", 4).unwrap();
	assert_eq!(component.renders(), 2);
	assert_eq!(component.get("double"), Value::Number(8.0));

	component.set("unknown", "defined now").unwrap();
	assert_eq!(component.renders(), 3);
	assert!(component.has("unknown"));

	component.set_computed("count", |_| Value::number(10)).unwrap();
	assert_eq!(component.renders(), 3);
	assert_eq!(component.get("double"), Value::Number(20.0));

	component.set("double", Attribute::computed(|_| Value::Bool(true))).unwrap();
	assert_eq!(component.renders(), 3);
	assert_eq!(component.get("double"), Value::Bool(true));
}

#[test]
fn computed_writes_show_up_on_the_next_render() {
	logging_::init();
	let mut component = Component::new("x-counter", &counter(), MemoryDom::new()).unwrap();
	let root = component.root();

	component.set_computed("count", |_| Value::from("later")).unwrap();
	assert_eq!(component.dom().text_content(root).unwrap(), "3");

	component.render().unwrap();
	assert_eq!(component.dom().text_content(root).unwrap(), "later");
}

#[test]
fn instances_do_not_share_state() {
	logging_::init();
	let mut registry = Registry::new();
	registry.register("x-counter", counter());

	let mut first = registry.create("x-counter", MemoryDom::new()).unwrap();
	let second = registry.create("x-counter", MemoryDom::new()).unwrap();

	first.set("count", 7).unwrap();
	assert_eq!(first.get("count"), Value::Number(7.0));
	assert_eq!(second.get("count"), Value::Number(3.0));
	assert_eq!(second.dom().text_content(second.root()).unwrap(), "3");
}

#[test]
fn values_display_like_template_text() {
	assert_eq!(Value::Null.to_string(), "null");
	assert_eq!(Value::number(1).to_string(), "1");
	assert_eq!(Value::Number(1.5).to_string(), "1.5");
	assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
	assert_eq!(Value::Bool(false).to_string(), "false");
	assert_eq!(Value::from(Some("text")).to_string(), "text");
	assert_eq!(Value::from(None::<i32>), Value::Null);
	assert_eq!(Value::from(" 42px").to_int(), Some(42.0));
	assert_eq!(Value::from("-7.9").to_int(), Some(-7.0));
	assert_eq!(Value::Number(-7.9).to_int(), Some(-7.0));
	assert_eq!(Value::from("px").to_int(), None);
}

#[test]
fn integer_prefixes_beyond_i64_still_read() {
	assert_eq!(Value::from("12345678901234567890").to_int(), Some(12_345_678_901_234_567_890.0));
	assert_eq!(Value::from("-99999999999999999999 tail").to_int(), Some(-99_999_999_999_999_999_999.0));
	assert_eq!(Value::Number(1e300).to_int(), Some(1e300));
	assert_eq!(Value::Number(f64::INFINITY).to_int(), None);
}
